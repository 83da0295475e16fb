//! Backend port for the internship-management API.
//!
//! The student and admin surfaces are separate traits so a student-facing
//! dashboard never holds a handle capable of admin overrides.

use crate::internship::domain::{
    AssignedTask, DomainPricing, GithubRepoUrl, Internship, PaymentAmount, PaymentId,
    PaymentReceipt, PaymentStatus, RejectionReason, StudentId, StudentTaskId, TaskStatusSummary,
    TransactionReference,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// The independently fetched read resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendResource {
    /// `GET /internship/details`.
    Internship,
    /// `GET /tasks/assigned`.
    AssignedTasks,
    /// `GET /tasks/status`.
    TaskStatus,
    /// `GET /domains`.
    Domains,
    /// `GET /payment/status`.
    PaymentStatus,
}

impl BackendResource {
    /// Every read resource, in fetch order.
    pub const ALL: [Self; 5] = [
        Self::Internship,
        Self::AssignedTasks,
        Self::TaskStatus,
        Self::Domains,
        Self::PaymentStatus,
    ];

    /// Returns a short stable name for logs and messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Internship => "internship",
            Self::AssignedTasks => "assigned_tasks",
            Self::TaskStatus => "task_status",
            Self::Domains => "domains",
            Self::PaymentStatus => "payment_status",
        }
    }
}

impl std::fmt::Display for BackendResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Student-facing backend contract.
#[async_trait]
pub trait StudentBackend: Send + Sync {
    /// `GET /internship/details`. `Ok(None)` means the student is not
    /// enrolled.
    async fn internship_details(&self) -> BackendResult<Option<Internship>>;

    /// `GET /tasks/assigned`.
    async fn assigned_tasks(&self) -> BackendResult<Vec<AssignedTask>>;

    /// `GET /tasks/status`.
    async fn task_status(&self) -> BackendResult<TaskStatusSummary>;

    /// `GET /domains`.
    async fn domains(&self) -> BackendResult<Vec<DomainPricing>>;

    /// `GET /payment/status`.
    async fn payment_status(&self) -> BackendResult<PaymentStatus>;

    /// `POST /tasks/submit-github`.
    async fn submit_github(&self, url: &GithubRepoUrl) -> BackendResult<()>;

    /// `POST /payment/initiate`.
    ///
    /// While a payment is pending the backend returns that payment instead
    /// of creating another one.
    async fn initiate_payment(&self, amount: PaymentAmount) -> BackendResult<PaymentReceipt>;

    /// `POST /payment/submit-transaction`.
    async fn submit_transaction(
        &self,
        payment_id: &PaymentId,
        reference: &TransactionReference,
    ) -> BackendResult<()>;
}

/// Privileged backend contract used by administrators.
#[async_trait]
pub trait AdminBackend: Send + Sync {
    /// `POST /admin/student/{id}/start-batch`.
    async fn start_batch(&self, student_id: &StudentId) -> BackendResult<()>;

    /// `POST /admin/student-tasks/override`.
    async fn override_task(
        &self,
        student_task_id: &StudentTaskId,
        approved: bool,
    ) -> BackendResult<()>;

    /// `POST /admin/payment/{id}/approve`.
    async fn approve_payment(&self, payment_id: &PaymentId) -> BackendResult<()>;

    /// `POST /admin/payment/{id}/reject`.
    async fn reject_payment(
        &self,
        payment_id: &PaymentId,
        reason: &RejectionReason,
    ) -> BackendResult<()>;
}

/// Errors returned by backend adapters.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(Arc<dyn std::error::Error + Send + Sync>),

    /// The backend answered with a non-success status.
    #[error("{message} (status {status})")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// No session token was available for an authenticated request.
    #[error("not signed in")]
    Unauthenticated,

    /// The response body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(Arc<dyn std::error::Error + Send + Sync>),
}

impl BackendError {
    /// Wraps a transport error.
    pub fn network(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Network(Arc::new(err))
    }

    /// Wraps a decoding error.
    pub fn decode(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Decode(Arc::new(err))
    }

    /// Builds a rejection with an explicit message.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Returns `true` when the failure happened before the server answered.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
