//! One-shot GitHub repository submission.

use super::{
    aggregator::SnapshotAggregator,
    failure::{FailureKind, backend_message},
    in_flight::InFlightRegistry,
};
use crate::internship::{
    domain::{GithubRepoUrl, InternshipDomainError, Snapshot, SubmissionProjection, is_batch_started},
    ports::{BackendError, StudentBackend},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

const SUBMISSION_KEY: &str = "submission";

/// Service-level errors for repository submission.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The URL is not a GitHub repository URL.
    #[error(transparent)]
    Domain(#[from] InternshipDomainError),
    /// No enrolment is loaded for the student.
    #[error("you are not enrolled in an internship")]
    NotEnrolled,
    /// The batch start date has not arrived.
    #[error("your batch has not started yet")]
    BatchNotStarted,
    /// No tasks are assigned yet.
    #[error("no tasks have been assigned yet")]
    NoTasksAssigned,
    /// A repository was already submitted.
    #[error("a repository has already been submitted: {0}")]
    AlreadySubmitted(String),
    /// A submission is still outstanding.
    #[error("a submission is already in progress")]
    OperationInFlight,
    /// The backend refused the request or could not be reached.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl SubmissionError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Backend(error) => FailureKind::of_backend(error),
            _ => FailureKind::InvalidInput,
        }
    }

    /// Returns a message suitable for display next to the submission form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(error) => backend_message(error),
            other => other.to_string(),
        }
    }
}

/// Result type for submission operations.
pub type SubmissionResult<T> = Result<T, SubmissionError>;

/// Submits the student's solution repository.
pub struct TaskSubmissionService<B, C>
where
    B: StudentBackend,
    C: Clock + Send + Sync,
{
    aggregator: Arc<SnapshotAggregator<B>>,
    clock: Arc<C>,
    in_flight: InFlightRegistry,
}

impl<B, C> TaskSubmissionService<B, C>
where
    B: StudentBackend,
    C: Clock + Send + Sync,
{
    /// Creates a submission service over a student's aggregator.
    #[must_use]
    pub fn new(aggregator: Arc<SnapshotAggregator<B>>, clock: Arc<C>) -> Self {
        Self {
            aggregator,
            clock,
            in_flight: InFlightRegistry::new(),
        }
    }

    /// Submits `raw_url` as the solution repository and refreshes the snapshot.
    ///
    /// # Errors
    ///
    /// Returns a validation variant when the URL is malformed, a repository
    /// was already submitted, or the enrolment has no started batch with
    /// tasks, and [`SubmissionError::Backend`] when the request fails.
    pub async fn submit_github(&self, raw_url: &str) -> SubmissionResult<Snapshot> {
        let url = GithubRepoUrl::new(raw_url)?;
        let snapshot = self.aggregator.current();

        if let SubmissionProjection::Submitted(existing) = &snapshot.submission {
            return Err(SubmissionError::AlreadySubmitted(existing.clone()));
        }
        let internship = snapshot
            .internship
            .as_ref()
            .ok_or(SubmissionError::NotEnrolled)?;
        if !is_batch_started(&internship.batch, self.clock.utc()) {
            return Err(SubmissionError::BatchNotStarted);
        }
        if snapshot.tasks().is_empty() {
            return Err(SubmissionError::NoTasksAssigned);
        }

        let _ticket = self
            .in_flight
            .try_acquire(SUBMISSION_KEY)
            .ok_or(SubmissionError::OperationInFlight)?;
        self.aggregator.backend().submit_github(&url).await?;
        info!(url = url.as_str(), "repository submitted");
        Ok(self.aggregator.refresh().await)
    }
}
