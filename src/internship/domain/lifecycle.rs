//! Derived lifecycle state.
//!
//! Everything here is a pure function of a [`Snapshot`] and the current
//! instant. Callers obtain the instant from a [`mockable::Clock`] so the
//! rules can be exercised at fixed points in time.

use super::{
    AssignedTask, Batch, Internship, PaymentState, Snapshot, SummaryInconsistency,
    TaskStatusSummary, UpiDisplay, certificate_price_for,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress reported before tasks are assigned.
pub const PROGRESS_ENROLLED: f64 = 10.0;
/// Progress reported once tasks are assigned.
pub const PROGRESS_TASKS_ASSIGNED: f64 = 30.0;
/// Base progress once at least one task is approved.
pub const PROGRESS_FIRST_APPROVAL: f64 = 50.0;
/// Progress span covered by approvals between the first and the last.
pub const PROGRESS_APPROVAL_SPAN: f64 = 30.0;
/// Progress reported when every task is approved.
pub const PROGRESS_ALL_APPROVED: f64 = 90.0;

/// Returns `true` once the batch start day has arrived.
///
/// Both operands are reduced to their calendar date, so a batch starting
/// later today already counts as started.
#[must_use]
pub fn is_batch_started(batch: &Batch, now: DateTime<Utc>) -> bool {
    batch.start_date.date_naive() <= now.date_naive()
}

/// Returns `true` once the batch end instant has passed.
#[must_use]
pub fn batch_ended(batch: &Batch, now: DateTime<Utc>) -> bool {
    batch.end_date <= now
}

/// Returns `true` when a payment deadline exists and lies in the past.
#[must_use]
pub fn payment_deadline_passed(batch: &Batch, now: DateTime<Utc>) -> bool {
    batch
        .payment_deadline
        .is_some_and(|deadline| deadline < now)
}

/// Numeric progress on a 0 to 90 scale.
///
/// Certificate issuance is not part of this scale; see
/// [`LifecycleView::certificate_unlocked`]. Summaries that contradict
/// themselves never produce the all-approved value, and approved counts are
/// clamped to the total.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "progress is a percentage rendered directly by the dashboard"
)]
pub fn progress(
    internship: Option<&Internship>,
    task_status: Option<&TaskStatusSummary>,
    assigned_tasks: &[AssignedTask],
) -> f64 {
    if internship.is_none() {
        return 0.0;
    }

    if let Some(summary) = task_status {
        if summary.trusted_all_approved() {
            return PROGRESS_ALL_APPROVED;
        }
        let approved = summary.approved_tasks.min(summary.total_tasks);
        if approved > 0 {
            let weighted = f64::from(approved) * PROGRESS_APPROVAL_SPAN;
            return PROGRESS_FIRST_APPROVAL + weighted / f64::from(summary.total_tasks);
        }
    }

    if assigned_tasks.is_empty() {
        PROGRESS_ENROLLED
    } else {
        PROGRESS_TASKS_ASSIGNED
    }
}

/// Discrete phase of a student's internship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleStage {
    /// The batch start date has not arrived.
    NotStarted,
    /// The batch has started but no tasks are assigned yet.
    AwaitingTasks,
    /// Tasks are assigned and not all approved.
    InProgress,
    /// Every task is approved and no payment has been made.
    AllApproved,
    /// A certificate payment awaits review.
    PaymentPending,
    /// The certificate payment was rejected.
    PaymentRejected,
    /// The certificate payment was approved.
    CertificateUnlocked,
}

impl LifecycleStage {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::AwaitingTasks => "AWAITING_TASKS",
            Self::InProgress => "IN_PROGRESS",
            Self::AllApproved => "ALL_APPROVED",
            Self::PaymentPending => "PAYMENT_PENDING",
            Self::PaymentRejected => "PAYMENT_REJECTED",
            Self::CertificateUnlocked => "CERTIFICATE_UNLOCKED",
        }
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes the lifecycle stage for an existing enrolment.
///
/// Checks run in a fixed order: batch start, task assignment, approval,
/// then payment state. A missing completion summary counts as "not all
/// approved".
#[must_use]
pub fn lifecycle_stage(
    internship: &Internship,
    task_status: Option<&TaskStatusSummary>,
    assigned_tasks: &[AssignedTask],
    payment: PaymentState,
    now: DateTime<Utc>,
) -> LifecycleStage {
    if !is_batch_started(&internship.batch, now) {
        return LifecycleStage::NotStarted;
    }
    if assigned_tasks.is_empty() {
        return LifecycleStage::AwaitingTasks;
    }
    if !task_status.is_some_and(TaskStatusSummary::trusted_all_approved) {
        return LifecycleStage::InProgress;
    }
    match payment {
        PaymentState::None => LifecycleStage::AllApproved,
        PaymentState::Pending => LifecycleStage::PaymentPending,
        PaymentState::Failed => LifecycleStage::PaymentRejected,
        PaymentState::Success => LifecycleStage::CertificateUnlocked,
    }
}

/// Next payment step a student can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentAction {
    /// Payment is not open yet (tasks outstanding or no enrolment).
    Unavailable,
    /// A payment can be initiated.
    Initiate,
    /// The payment is pending and its QR code is still generating.
    AwaitingQrCode,
    /// The student should pay and submit the transaction reference.
    SubmitReference,
    /// The reference is submitted and awaits admin review.
    AwaitingApproval,
    /// The last payment was rejected and a new one may be initiated.
    Retry,
    /// The deadline has passed; only support can help.
    ContactSupport,
    /// The certificate is unlocked.
    CertificateReady,
}

/// Everything a dashboard needs, derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleView {
    /// Discrete stage; `None` when the student has no enrolment.
    pub stage: Option<LifecycleStage>,
    /// Progress on a 0 to 90 scale.
    pub progress: f64,
    /// Whether the batch start day has arrived.
    pub batch_started: bool,
    /// Whether the batch end instant has passed.
    pub batch_ended: bool,
    /// Whether the payment deadline has passed.
    pub payment_deadline_passed: bool,
    /// Whether a trusted summary reports every task approved.
    pub all_approved: bool,
    /// Whether the certificate payment was approved.
    pub certificate_unlocked: bool,
    /// Certificate price for the student's domain, when known.
    pub certificate_price: Option<Decimal>,
    /// Contradiction found in the backend summary, if any.
    pub inconsistency: Option<SummaryInconsistency>,
    /// Recommended payment step.
    pub payment_action: PaymentAction,
}

impl LifecycleView {
    /// Derives the full view from a snapshot at `now`.
    #[must_use]
    pub fn derive(snapshot: &Snapshot, now: DateTime<Utc>) -> Self {
        let tasks = snapshot.tasks();
        let summary = snapshot.task_status.as_ref();
        let payment = snapshot.payment_state();
        let inconsistency = summary.and_then(|status| status.validate().err());
        let all_approved = summary.is_some_and(TaskStatusSummary::trusted_all_approved);

        let Some(internship) = snapshot.internship.as_ref() else {
            return Self {
                stage: None,
                progress: progress(None, summary, tasks),
                batch_started: false,
                batch_ended: false,
                payment_deadline_passed: false,
                all_approved,
                certificate_unlocked: payment == PaymentState::Success,
                certificate_price: None,
                inconsistency,
                payment_action: PaymentAction::Unavailable,
            };
        };

        let batch = &internship.batch;
        let deadline_passed = payment_deadline_passed(batch, now);
        let certificate_price = snapshot
            .domain_pricing
            .as_deref()
            .and_then(|domains| certificate_price_for(domains, &internship.domain));

        Self {
            stage: Some(lifecycle_stage(internship, summary, tasks, payment, now)),
            progress: progress(Some(internship), summary, tasks),
            batch_started: is_batch_started(batch, now),
            batch_ended: batch_ended(batch, now),
            payment_deadline_passed: deadline_passed,
            all_approved,
            certificate_unlocked: payment == PaymentState::Success,
            certificate_price,
            inconsistency,
            payment_action: payment_action(snapshot, all_approved, deadline_passed),
        }
    }

    /// Returns `true` when a payment may be initiated right now.
    #[must_use]
    pub const fn can_initiate_payment(&self) -> bool {
        matches!(
            self.payment_action,
            PaymentAction::Initiate | PaymentAction::Retry
        )
    }
}

fn payment_action(snapshot: &Snapshot, all_approved: bool, deadline_passed: bool) -> PaymentAction {
    let payment = snapshot.payment_status.as_ref();
    match snapshot.payment_state() {
        PaymentState::Success => PaymentAction::CertificateReady,
        _ if !all_approved => PaymentAction::Unavailable,
        PaymentState::Pending if payment.is_some_and(|record| record.has_transaction_reference()) => {
            PaymentAction::AwaitingApproval
        }
        PaymentState::Pending => match snapshot.upi_display {
            UpiDisplay::Generating => PaymentAction::AwaitingQrCode,
            UpiDisplay::Hidden | UpiDisplay::Ready(_) => PaymentAction::SubmitReference,
        },
        PaymentState::None | PaymentState::Failed if deadline_passed => {
            PaymentAction::ContactSupport
        }
        PaymentState::None => PaymentAction::Initiate,
        PaymentState::Failed => PaymentAction::Retry,
    }
}
