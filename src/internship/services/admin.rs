//! Privileged overrides issued by administrators.
//!
//! Each operation is one backend mutation followed by a refresh of every
//! attached student view, so the derived lifecycle reflects the override.

use super::{
    aggregator::SnapshotRefresher,
    failure::{FailureKind, backend_message},
    in_flight::InFlightRegistry,
};
use crate::internship::{
    domain::{InternshipDomainError, PaymentId, RejectionReason, StudentId, StudentTaskId},
    ports::{AdminBackend, BackendError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Service-level errors for admin overrides.
#[derive(Debug, Error)]
pub enum AdminOverrideError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] InternshipDomainError),
    /// The same override is already running for this entity.
    #[error("an override for {0} is already in progress")]
    OperationInFlight(String),
    /// The backend refused the request or could not be reached.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl AdminOverrideError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Backend(error) => FailureKind::of_backend(error),
            Self::Domain(_) | Self::OperationInFlight(_) => FailureKind::InvalidInput,
        }
    }

    /// Returns a message suitable for display next to the admin control.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(error) => backend_message(error),
            other => other.to_string(),
        }
    }
}

/// Result type for admin override operations.
pub type AdminOverrideResult<T> = Result<T, AdminOverrideError>;

/// Issues admin overrides and re-aggregates attached views.
pub struct AdminOverrideService<A>
where
    A: AdminBackend,
{
    backend: Arc<A>,
    views: Vec<Arc<dyn SnapshotRefresher>>,
    in_flight: InFlightRegistry,
}

impl<A> AdminOverrideService<A>
where
    A: AdminBackend,
{
    /// Creates an admin service with no attached views.
    #[must_use]
    pub fn new(backend: Arc<A>) -> Self {
        Self {
            backend,
            views: Vec::new(),
            in_flight: InFlightRegistry::new(),
        }
    }

    /// Attaches a student view to refresh after every override.
    #[must_use]
    pub fn with_view(mut self, view: Arc<dyn SnapshotRefresher>) -> Self {
        self.views.push(view);
        self
    }

    /// Forces a student's batch to start today.
    ///
    /// The backend assigns the task set and marks the batch `RUNNING`. A
    /// second call for the same student while the first is outstanding is
    /// refused.
    ///
    /// # Errors
    ///
    /// Returns [`AdminOverrideError::OperationInFlight`] for a concurrent
    /// duplicate and [`AdminOverrideError::Backend`] when the request fails.
    pub async fn force_start_batch(&self, student_id: &StudentId) -> AdminOverrideResult<()> {
        let key = format!("start-batch:{student_id}");
        let _ticket = self
            .in_flight
            .try_acquire(key.clone())
            .ok_or(AdminOverrideError::OperationInFlight(key))?;
        self.backend.start_batch(student_id).await?;
        info!(student_id = %student_id, "batch force-started");
        self.refresh_views().await;
        Ok(())
    }

    /// Sets a task's decision to approved or rejected.
    ///
    /// # Errors
    ///
    /// Returns [`AdminOverrideError::OperationInFlight`] for a concurrent
    /// duplicate and [`AdminOverrideError::Backend`] when the request fails.
    pub async fn override_task(
        &self,
        student_task_id: &StudentTaskId,
        approved: bool,
    ) -> AdminOverrideResult<()> {
        let key = format!("task:{student_task_id}");
        let _ticket = self
            .in_flight
            .try_acquire(key.clone())
            .ok_or(AdminOverrideError::OperationInFlight(key))?;
        self.backend
            .override_task(student_task_id, approved)
            .await?;
        info!(student_task_id = %student_task_id, approved, "task decision overridden");
        self.refresh_views().await;
        Ok(())
    }

    /// Approves a pending payment, unlocking the certificate.
    ///
    /// # Errors
    ///
    /// Returns [`AdminOverrideError::OperationInFlight`] for a concurrent
    /// decision on the same payment and [`AdminOverrideError::Backend`] when
    /// the request fails.
    pub async fn approve_payment(&self, payment_id: &PaymentId) -> AdminOverrideResult<()> {
        let key = format!("payment:{payment_id}");
        let _ticket = self
            .in_flight
            .try_acquire(key.clone())
            .ok_or(AdminOverrideError::OperationInFlight(key))?;
        self.backend.approve_payment(payment_id).await?;
        info!(payment_id = %payment_id, "payment approved");
        self.refresh_views().await;
        Ok(())
    }

    /// Rejects a pending payment with a reason shown to the student.
    ///
    /// # Errors
    ///
    /// Returns [`AdminOverrideError::Domain`] when the reason is blank,
    /// [`AdminOverrideError::OperationInFlight`] for a concurrent decision on
    /// the same payment, and [`AdminOverrideError::Backend`] when the
    /// request fails.
    pub async fn reject_payment(
        &self,
        payment_id: &PaymentId,
        raw_reason: &str,
    ) -> AdminOverrideResult<()> {
        let reason = RejectionReason::new(raw_reason)?;
        let key = format!("payment:{payment_id}");
        let _ticket = self
            .in_flight
            .try_acquire(key.clone())
            .ok_or(AdminOverrideError::OperationInFlight(key))?;
        self.backend.reject_payment(payment_id, &reason).await?;
        info!(payment_id = %payment_id, reason = reason.as_str(), "payment rejected");
        self.refresh_views().await;
        Ok(())
    }

    async fn refresh_views(&self) {
        for view in &self.views {
            view.refresh().await;
        }
    }
}
