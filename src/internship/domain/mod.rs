//! Domain model for the internship lifecycle.
//!
//! Wire-compatible records for enrolment, tasks, payments and pricing, the
//! [`Snapshot`] that aggregates them, and the pure lifecycle derivation
//! rules. Nothing in this module performs I/O.

mod batch;
mod error;
mod ids;
mod lifecycle;
mod payment;
mod pricing;
mod snapshot;
mod submission;
mod task;

pub use batch::{Batch, BatchStatus, Internship};
pub use error::{InternshipDomainError, ParseStatusError};
pub use ids::{PaymentId, StudentId, StudentTaskId, TaskTemplateId};
pub use lifecycle::{
    LifecycleStage, LifecycleView, PROGRESS_ALL_APPROVED, PROGRESS_APPROVAL_SPAN,
    PROGRESS_ENROLLED, PROGRESS_FIRST_APPROVAL, PROGRESS_TASKS_ASSIGNED, PaymentAction,
    batch_ended, is_batch_started, lifecycle_stage, payment_deadline_passed, progress,
};
pub use payment::{
    PaymentAmount, PaymentReceipt, PaymentState, PaymentStatus, RejectionReason,
    TransactionReference,
};
pub use pricing::{DomainPricing, certificate_price_for};
pub use snapshot::{Snapshot, UpiDisplay};
pub use submission::{GithubRepoUrl, SubmissionProjection};
pub use task::{
    AssignedTask, AssignedTaskStatus, SummaryInconsistency, TaskDefinition, TaskStatusSummary,
};
