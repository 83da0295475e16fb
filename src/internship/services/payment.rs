//! Certificate payment workflow.
//!
//! The service checks every precondition against the current snapshot before
//! touching the network, issues exactly one backend mutation, then refreshes
//! the snapshot. It never moves a payment to `SUCCESS` or `FAILED` itself;
//! those transitions arrive from admin decisions on the next refresh.

use super::{
    aggregator::SnapshotAggregator,
    failure::{FailureKind, backend_message},
    in_flight::InFlightRegistry,
};
use crate::internship::{
    domain::{
        InternshipDomainError, PaymentAmount, PaymentId, PaymentReceipt, PaymentState, Snapshot,
        SummaryInconsistency, TransactionReference, certificate_price_for,
        payment_deadline_passed,
    },
    ports::{BackendError, BackendResource, StudentBackend},
};
use mockable::Clock;
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

const PAYMENT_KEY: &str = "payment";

/// Service-level errors for payment operations.
#[derive(Debug, Error)]
pub enum PaymentWorkflowError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] InternshipDomainError),
    /// No enrolment is loaded for the student.
    #[error("you are not enrolled in an internship")]
    NotEnrolled,
    /// Not every task is approved yet.
    #[error("all tasks must be approved before paying for the certificate")]
    TasksNotApproved,
    /// The backend summary contradicts itself.
    #[error("task summary is inconsistent: {0}")]
    InconsistentSummary(SummaryInconsistency),
    /// The payment deadline has passed.
    #[error("the payment deadline has passed; please contact support")]
    DeadlinePassed,
    /// The certificate is already paid for.
    #[error("the certificate payment has already been approved")]
    AlreadyPaid,
    /// No certificate price is known for the enrolment's domain.
    #[error("no certificate price is available for domain '{0}'")]
    PriceUnavailable(String),
    /// There is no pending payment to attach a reference to.
    #[error("there is no pending payment")]
    NoPendingPayment,
    /// The payment id does not match the pending payment.
    #[error("payment {0} is not the pending payment")]
    UnknownPayment(PaymentId),
    /// A reference was already submitted for the pending payment.
    #[error("a transaction reference has already been submitted for payment {0}")]
    ReferenceAlreadySubmitted(PaymentId),
    /// Another payment mutation is still outstanding.
    #[error("a payment request is already in progress")]
    OperationInFlight,
    /// The backend refused the request or could not be reached.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl PaymentWorkflowError {
    /// Classifies the failure.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Backend(error) => FailureKind::of_backend(error),
            _ => FailureKind::InvalidInput,
        }
    }

    /// Returns a message suitable for display next to the payment controls.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(error) => backend_message(error),
            other => other.to_string(),
        }
    }
}

/// Result type for payment workflow operations.
pub type PaymentWorkflowResult<T> = Result<T, PaymentWorkflowError>;

/// A successful initiation together with the refreshed snapshot.
#[derive(Debug, Clone)]
pub struct PaymentInitiated {
    /// The payment the backend considers pending.
    pub receipt: PaymentReceipt,
    /// Snapshot after the follow-up refresh.
    pub snapshot: Snapshot,
}

/// Drives the certificate payment state machine.
pub struct PaymentWorkflowService<B, C>
where
    B: StudentBackend,
    C: Clock + Send + Sync,
{
    aggregator: Arc<SnapshotAggregator<B>>,
    clock: Arc<C>,
    in_flight: InFlightRegistry,
}

impl<B, C> PaymentWorkflowService<B, C>
where
    B: StudentBackend,
    C: Clock + Send + Sync,
{
    /// Creates a payment service over a student's aggregator.
    #[must_use]
    pub fn new(aggregator: Arc<SnapshotAggregator<B>>, clock: Arc<C>) -> Self {
        Self {
            aggregator,
            clock,
            in_flight: InFlightRegistry::new(),
        }
    }

    /// Initiates (or resumes) the certificate payment for `value`.
    ///
    /// While a payment is pending the backend answers with that payment, so
    /// repeated calls converge on one payment id.
    ///
    /// # Errors
    ///
    /// Returns a validation variant when the amount is not positive or the
    /// snapshot does not permit payment, and
    /// [`PaymentWorkflowError::Backend`] when the request fails.
    pub async fn initiate(&self, value: Decimal) -> PaymentWorkflowResult<PaymentInitiated> {
        let amount = PaymentAmount::new(value)?;
        let snapshot = self.aggregator.current();
        self.check_can_initiate(&snapshot)?;
        self.send_initiate(amount).await
    }

    /// Initiates the certificate payment at the price listed for the
    /// enrolment's domain.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentWorkflowError::PriceUnavailable`] when pricing for
    /// the domain is unknown, plus every error of [`Self::initiate`].
    pub async fn initiate_for_certificate(&self) -> PaymentWorkflowResult<PaymentInitiated> {
        let snapshot = self.aggregator.current();
        self.check_can_initiate(&snapshot)?;
        let domain = snapshot
            .internship
            .as_ref()
            .map(|internship| internship.domain.clone())
            .ok_or(PaymentWorkflowError::NotEnrolled)?;
        let price = snapshot
            .domain_pricing
            .as_deref()
            .and_then(|domains| certificate_price_for(domains, &domain))
            .ok_or_else(|| PaymentWorkflowError::PriceUnavailable(domain.clone()))?;
        let amount = PaymentAmount::new(price)?;
        self.send_initiate(amount).await
    }

    /// Submits the bank transaction reference for the pending payment.
    ///
    /// Only one reference may ever be submitted per payment; a second
    /// attempt is refused without a network request.
    ///
    /// # Errors
    ///
    /// Returns a validation variant when the reference is blank, a
    /// reference already exists, or `payment_id` is not the pending payment,
    /// and [`PaymentWorkflowError::Backend`] when the request fails.
    pub async fn submit_transaction_reference(
        &self,
        payment_id: &PaymentId,
        raw_reference: &str,
    ) -> PaymentWorkflowResult<Snapshot> {
        let reference = TransactionReference::new(raw_reference)?;
        let snapshot = self.aggregator.current();
        let payment = snapshot
            .payment_status
            .as_ref()
            .ok_or(PaymentWorkflowError::NoPendingPayment)?;

        if payment.has_transaction_reference() {
            return Err(PaymentWorkflowError::ReferenceAlreadySubmitted(
                payment_id.clone(),
            ));
        }
        if payment.status != PaymentState::Pending {
            return Err(PaymentWorkflowError::NoPendingPayment);
        }
        if payment.payment_id.as_ref() != Some(payment_id) {
            return Err(PaymentWorkflowError::UnknownPayment(payment_id.clone()));
        }

        let _ticket = self
            .in_flight
            .try_acquire(PAYMENT_KEY)
            .ok_or(PaymentWorkflowError::OperationInFlight)?;
        self.aggregator
            .backend()
            .submit_transaction(payment_id, &reference)
            .await?;
        info!(payment_id = %payment_id, "transaction reference submitted");
        Ok(self.aggregator.refresh().await)
    }

    fn check_can_initiate(&self, snapshot: &Snapshot) -> PaymentWorkflowResult<()> {
        let internship = snapshot
            .internship
            .as_ref()
            .ok_or(PaymentWorkflowError::NotEnrolled)?;
        if snapshot.payment_state() == PaymentState::Success {
            return Err(PaymentWorkflowError::AlreadyPaid);
        }

        let summary = snapshot
            .task_status
            .as_ref()
            .ok_or(PaymentWorkflowError::TasksNotApproved)?;
        if let Err(inconsistency) = summary.validate() {
            warn!(%inconsistency, "refusing payment on inconsistent task summary");
            return Err(PaymentWorkflowError::InconsistentSummary(inconsistency));
        }
        if !summary.all_approved {
            return Err(PaymentWorkflowError::TasksNotApproved);
        }

        if payment_deadline_passed(&internship.batch, self.clock.utc()) {
            return Err(PaymentWorkflowError::DeadlinePassed);
        }
        Ok(())
    }

    async fn send_initiate(&self, amount: PaymentAmount) -> PaymentWorkflowResult<PaymentInitiated> {
        let _ticket = self
            .in_flight
            .try_acquire(PAYMENT_KEY)
            .ok_or(PaymentWorkflowError::OperationInFlight)?;
        let receipt = self.aggregator.backend().initiate_payment(amount).await?;
        info!(
            payment_id = %receipt.payment_id,
            amount = %receipt.amount,
            "certificate payment initiated"
        );
        let outcome = self.aggregator.refresh_with_failures().await;
        let snapshot = if outcome.failed(BackendResource::PaymentStatus) {
            warn!(
                payment_id = %receipt.payment_id,
                "payment status unavailable after initiation; keeping receipt"
            );
            self.aggregator.record_pending_payment(&receipt)
        } else {
            outcome.snapshot
        };
        Ok(PaymentInitiated { receipt, snapshot })
    }
}
