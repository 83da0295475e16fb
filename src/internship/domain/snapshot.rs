//! The orchestrator's best-known view of one student's internship.

use super::{
    AssignedTask, DomainPricing, Internship, PaymentState, PaymentStatus, SubmissionProjection,
    TaskStatusSummary,
};
use serde::{Deserialize, Serialize};

/// UPI link the payment screen should display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "url", rename_all = "snake_case")]
pub enum UpiDisplay {
    /// No pending payment, so nothing to display.
    #[default]
    Hidden,
    /// A payment is pending but the backend has not delivered the QR link.
    Generating,
    /// The QR link for the pending payment.
    Ready(String),
}

impl UpiDisplay {
    /// Routes a freshly fetched payment record to a display state.
    #[must_use]
    pub fn for_payment(payment: &PaymentStatus) -> Self {
        if payment.status != PaymentState::Pending {
            return Self::Hidden;
        }
        payment
            .upi_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map_or(Self::Generating, |url| Self::Ready(url.to_owned()))
    }
}

/// Snapshot of every resource describing a student's internship.
///
/// Each field is independently absent (never fetched successfully) or
/// holds the value of the most recent successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Enrolment details; `None` also after a successful fetch reporting no
    /// enrolment.
    pub internship: Option<Internship>,
    /// Assigned tasks.
    pub assigned_tasks: Option<Vec<AssignedTask>>,
    /// Server-side completion summary.
    pub task_status: Option<TaskStatusSummary>,
    /// Certificate payment record.
    pub payment_status: Option<PaymentStatus>,
    /// Domain pricing reference data.
    pub domain_pricing: Option<Vec<DomainPricing>>,
    /// Representative repository submission.
    pub submission: SubmissionProjection,
    /// UPI link display state.
    pub upi_display: UpiDisplay,
}

impl Snapshot {
    /// Returns an empty snapshot.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replaces the enrolment details with a successful fetch result.
    pub fn apply_internship(&mut self, internship: Option<Internship>) {
        self.internship = internship;
    }

    /// Replaces the task list and recomputes the submission projection.
    pub fn apply_assigned_tasks(&mut self, tasks: Vec<AssignedTask>) {
        self.submission = SubmissionProjection::from_tasks(&tasks);
        self.assigned_tasks = Some(tasks);
    }

    /// Replaces the completion summary.
    pub const fn apply_task_status(&mut self, summary: TaskStatusSummary) {
        self.task_status = Some(summary);
    }

    /// Replaces the domain pricing list.
    pub fn apply_domain_pricing(&mut self, domains: Vec<DomainPricing>) {
        self.domain_pricing = Some(domains);
    }

    /// Replaces the payment record and reroutes the UPI display.
    pub fn apply_payment_status(&mut self, payment: PaymentStatus) {
        self.upi_display = UpiDisplay::for_payment(&payment);
        self.payment_status = Some(payment);
    }

    /// Returns the assigned tasks, or an empty slice when never loaded.
    #[must_use]
    pub fn tasks(&self) -> &[AssignedTask] {
        self.assigned_tasks.as_deref().unwrap_or_default()
    }

    /// Returns the known payment state, treating "never loaded" as none.
    #[must_use]
    pub fn payment_state(&self) -> PaymentState {
        self.payment_status
            .as_ref()
            .map_or(PaymentState::None, |payment| payment.status)
    }
}
