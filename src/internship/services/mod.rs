//! Service layer for the internship lifecycle.

mod admin;
mod aggregator;
mod failure;
mod in_flight;
mod payment;
mod submission;

pub use admin::{AdminOverrideError, AdminOverrideResult, AdminOverrideService};
pub use aggregator::{AggregationOutcome, FetchFailure, SnapshotAggregator, SnapshotRefresher};
pub use failure::{FailureKind, backend_message};
pub use in_flight::{InFlightRegistry, InFlightTicket};
pub use payment::{
    PaymentInitiated, PaymentWorkflowError, PaymentWorkflowResult, PaymentWorkflowService,
};
pub use submission::{SubmissionError, SubmissionResult, TaskSubmissionService};
