//! In-memory backend for orchestrator tests and local demos.

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use mockable::{Clock, DefaultClock};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::internship::{
    domain::{
        AssignedTask, AssignedTaskStatus, BatchStatus, DomainPricing, GithubRepoUrl, Internship,
        PaymentAmount, PaymentId, PaymentReceipt, PaymentState, PaymentStatus, RejectionReason,
        StudentId, StudentTaskId, TaskDefinition, TaskStatusSummary, TransactionReference,
    },
    ports::{AdminBackend, BackendError, BackendResource, BackendResult, StudentBackend},
};

/// Thread-safe in-memory model of one student's backend records.
///
/// The adapter applies the same rules the real backend is documented to
/// apply (idempotent initiation, one-shot references, terminal admin
/// decisions) so services can be exercised end to end without a network.
/// Read failures and one-shot mutation failures can be injected.
#[derive(Debug)]
pub struct InMemoryBackend<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    state: Arc<RwLock<InMemoryState>>,
    clock: Arc<C>,
}

impl<C> Clone for InMemoryBackend<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

#[derive(Debug, Default)]
struct InMemoryState {
    student_id: Option<StudentId>,
    internship: Option<Internship>,
    tasks: Vec<AssignedTask>,
    task_catalogue: Vec<TaskDefinition>,
    summary_override: Option<TaskStatusSummary>,
    domains: Vec<DomainPricing>,
    payments: Vec<StoredPayment>,
    next_payment_id: u64,
    defer_qr_code: bool,
    failing_reads: HashSet<BackendResource>,
    next_mutation_failure: Option<BackendError>,
    calls: Vec<&'static str>,
}

#[derive(Debug, Clone)]
struct StoredPayment {
    id: PaymentId,
    amount: Decimal,
    upi_url: Option<String>,
    transaction_reference: Option<String>,
    state: PaymentState,
    rejected_reason: Option<String>,
}

impl StoredPayment {
    fn to_status(&self) -> PaymentStatus {
        PaymentStatus {
            status: self.state,
            payment_id: Some(self.id.clone()),
            amount: Some(self.amount),
            upi_url: self.upi_url.clone(),
            transaction_reference: self.transaction_reference.clone(),
            rejected_reason: self.rejected_reason.clone(),
        }
    }

    fn to_receipt(&self) -> PaymentReceipt {
        PaymentReceipt {
            payment_id: self.id.clone(),
            amount: self.amount,
            upi_url: self.upi_url.clone(),
        }
    }
}

/// Builder for [`InMemoryBackend`] seed data.
#[derive(Debug, Default)]
pub struct InMemoryBackendBuilder {
    state: InMemoryState,
}

impl InMemoryBackendBuilder {
    /// Sets the student identifier accepted by admin operations.
    #[must_use]
    pub fn student_id(mut self, student_id: StudentId) -> Self {
        self.state.student_id = Some(student_id);
        self
    }

    /// Enrols the student.
    #[must_use]
    pub fn internship(mut self, internship: Internship) -> Self {
        self.state.internship = Some(internship);
        self
    }

    /// Seeds already assigned tasks.
    #[must_use]
    pub fn assigned_tasks(mut self, tasks: Vec<AssignedTask>) -> Self {
        self.state.tasks = tasks;
        self
    }

    /// Sets the catalogue assigned when a batch is force-started.
    #[must_use]
    pub fn task_catalogue(mut self, catalogue: Vec<TaskDefinition>) -> Self {
        self.state.task_catalogue = catalogue;
        self
    }

    /// Seeds domain pricing.
    #[must_use]
    pub fn domains(mut self, domains: Vec<DomainPricing>) -> Self {
        self.state.domains = domains;
        self
    }

    /// Seeds an existing payment record.
    #[must_use]
    pub fn payment(mut self, payment: PaymentStatus) -> Self {
        if let Some(id) = payment.payment_id {
            self.state.payments.push(StoredPayment {
                id,
                amount: payment.amount.unwrap_or_default(),
                upi_url: payment.upi_url,
                transaction_reference: payment.transaction_reference,
                state: payment.status,
                rejected_reason: payment.rejected_reason,
            });
        }
        self
    }

    /// Sets the identifier assigned to the next new payment.
    #[must_use]
    pub const fn next_payment_id(mut self, id: u64) -> Self {
        self.state.next_payment_id = id;
        self
    }

    /// Builds a backend reading time from `clock`.
    #[must_use]
    pub fn build_with_clock<C>(mut self, clock: Arc<C>) -> InMemoryBackend<C>
    where
        C: Clock + Send + Sync,
    {
        if self.state.next_payment_id == 0 {
            self.state.next_payment_id = 1;
        }
        InMemoryBackend {
            state: Arc::new(RwLock::new(self.state)),
            clock,
        }
    }

    /// Builds a backend reading the system clock.
    #[must_use]
    pub fn build(self) -> InMemoryBackend {
        self.build_with_clock(Arc::new(DefaultClock))
    }
}

fn lock_error(err: impl std::fmt::Display) -> BackendError {
    BackendError::network(std::io::Error::other(err.to_string()))
}

fn not_found(what: &str) -> BackendError {
    BackendError::rejected(404, format!("{what} not found"))
}

impl InMemoryBackend {
    /// Starts building a backend.
    #[must_use]
    pub fn builder() -> InMemoryBackendBuilder {
        InMemoryBackendBuilder::default()
    }
}

impl<C> InMemoryBackend<C>
where
    C: Clock + Send + Sync,
{
    fn read(&self) -> BackendResult<RwLockReadGuard<'_, InMemoryState>> {
        self.state.read().map_err(lock_error)
    }

    fn write(&self) -> BackendResult<RwLockWriteGuard<'_, InMemoryState>> {
        self.state.write().map_err(lock_error)
    }

    /// Makes reads of `resource` fail (or succeed again).
    ///
    /// # Errors
    ///
    /// Returns a network error when lock acquisition fails.
    pub fn set_read_failure(&self, resource: BackendResource, failing: bool) -> BackendResult<()> {
        let mut state = self.write()?;
        if failing {
            state.failing_reads.insert(resource);
        } else {
            state.failing_reads.remove(&resource);
        }
        Ok(())
    }

    /// Makes the next mutation fail with `error` without applying it.
    ///
    /// # Errors
    ///
    /// Returns a network error when lock acquisition fails.
    pub fn fail_next_mutation(&self, error: BackendError) -> BackendResult<()> {
        self.write()?.next_mutation_failure = Some(error);
        Ok(())
    }

    /// Replaces the computed completion summary with a fixed value.
    ///
    /// # Errors
    ///
    /// Returns a network error when lock acquisition fails.
    pub fn override_task_summary(&self, summary: Option<TaskStatusSummary>) -> BackendResult<()> {
        self.write()?.summary_override = summary;
        Ok(())
    }

    /// Controls whether new payments are created without a UPI link.
    ///
    /// # Errors
    ///
    /// Returns a network error when lock acquisition fails.
    pub fn defer_qr_code(&self, deferred: bool) -> BackendResult<()> {
        self.write()?.defer_qr_code = deferred;
        Ok(())
    }

    /// Delivers a UPI link for a pending payment that was created without one.
    ///
    /// # Errors
    ///
    /// Returns a rejection when the payment does not exist.
    pub fn deliver_qr_code(&self, payment_id: &PaymentId) -> BackendResult<()> {
        let mut state = self.write()?;
        let payment = state
            .payments
            .iter_mut()
            .find(|payment| &payment.id == payment_id)
            .ok_or_else(|| not_found("payment"))?;
        payment.upi_url = Some(upi_url(payment.amount, &payment.id));
        Ok(())
    }

    /// Returns the names of backend operations invoked so far, in order.
    ///
    /// # Errors
    ///
    /// Returns a network error when lock acquisition fails.
    pub fn calls(&self) -> BackendResult<Vec<&'static str>> {
        Ok(self.read()?.calls.clone())
    }

    /// Returns how many payments have been created or seeded.
    ///
    /// # Errors
    ///
    /// Returns a network error when lock acquisition fails.
    pub fn payment_count(&self) -> BackendResult<usize> {
        Ok(self.read()?.payments.len())
    }

    fn begin_read(
        &self,
        resource: BackendResource,
    ) -> BackendResult<RwLockWriteGuard<'_, InMemoryState>> {
        let mut state = self.write()?;
        state.calls.push(resource.as_str());
        if state.failing_reads.contains(&resource) {
            return Err(BackendError::rejected(
                503,
                format!("{resource} temporarily unavailable"),
            ));
        }
        Ok(state)
    }

    fn begin_mutation(
        &self,
        name: &'static str,
    ) -> BackendResult<RwLockWriteGuard<'_, InMemoryState>> {
        let mut state = self.write()?;
        state.calls.push(name);
        if let Some(error) = state.next_mutation_failure.take() {
            return Err(error);
        }
        Ok(state)
    }

    fn start_of_today(&self) -> DateTime<Utc> {
        self.clock
            .utc()
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc()
    }
}

fn upi_url(amount: Decimal, payment_id: &PaymentId) -> String {
    format!("upi://pay?pa=certificates@upi&am={amount}&tn=CERT-{payment_id}")
}

fn latest_payment(state: &InMemoryState) -> Option<&StoredPayment> {
    state.payments.last()
}

fn find_payment<'a>(
    state: &'a mut InMemoryState,
    payment_id: &PaymentId,
) -> BackendResult<&'a mut StoredPayment> {
    state
        .payments
        .iter_mut()
        .find(|payment| &payment.id == payment_id)
        .ok_or_else(|| not_found("payment"))
}

fn ensure_pending(payment: &StoredPayment) -> BackendResult<()> {
    if payment.state != PaymentState::Pending {
        return Err(BackendError::rejected(
            409,
            format!("payment is {}, not PENDING", payment.state),
        ));
    }
    Ok(())
}

#[async_trait]
impl<C> StudentBackend for InMemoryBackend<C>
where
    C: Clock + Send + Sync,
{
    async fn internship_details(&self) -> BackendResult<Option<Internship>> {
        let state = self.begin_read(BackendResource::Internship)?;
        Ok(state.internship.clone())
    }

    async fn assigned_tasks(&self) -> BackendResult<Vec<AssignedTask>> {
        let state = self.begin_read(BackendResource::AssignedTasks)?;
        Ok(state.tasks.clone())
    }

    async fn task_status(&self) -> BackendResult<TaskStatusSummary> {
        let state = self.begin_read(BackendResource::TaskStatus)?;
        Ok(state
            .summary_override
            .unwrap_or_else(|| TaskStatusSummary::from_tasks(&state.tasks)))
    }

    async fn domains(&self) -> BackendResult<Vec<DomainPricing>> {
        let state = self.begin_read(BackendResource::Domains)?;
        Ok(state.domains.clone())
    }

    async fn payment_status(&self) -> BackendResult<PaymentStatus> {
        let state = self.begin_read(BackendResource::PaymentStatus)?;
        Ok(latest_payment(&state).map_or_else(PaymentStatus::none, StoredPayment::to_status))
    }

    async fn submit_github(&self, url: &GithubRepoUrl) -> BackendResult<()> {
        let mut state = self.begin_mutation("submit_github")?;
        if state.tasks.is_empty() {
            return Err(BackendError::rejected(400, "No tasks assigned yet"));
        }
        if state.tasks.iter().any(|task| task.github_url.is_some()) {
            return Err(BackendError::rejected(409, "Repository already submitted"));
        }
        for task in &mut state.tasks {
            task.github_url = Some(url.as_str().to_owned());
            if task.status == AssignedTaskStatus::Pending {
                task.status = AssignedTaskStatus::Submitted;
            }
        }
        Ok(())
    }

    async fn initiate_payment(&self, amount: PaymentAmount) -> BackendResult<PaymentReceipt> {
        let now = self.clock.utc();
        let mut state = self.begin_mutation("initiate_payment")?;

        if !TaskStatusSummary::from_tasks(&state.tasks).all_approved {
            return Err(BackendError::rejected(
                400,
                "All tasks must be approved before payment",
            ));
        }
        let deadline_passed = state
            .internship
            .as_ref()
            .and_then(|internship| internship.batch.payment_deadline)
            .is_some_and(|deadline| deadline < now);

        if let Some(existing) = latest_payment(&state) {
            match existing.state {
                PaymentState::Pending => return Ok(existing.to_receipt()),
                PaymentState::Success => {
                    return Err(BackendError::rejected(409, "Certificate already paid"));
                }
                PaymentState::None | PaymentState::Failed => {}
            }
        }
        if deadline_passed {
            return Err(BackendError::rejected(400, "Payment deadline has passed"));
        }

        let raw_id = state.next_payment_id;
        state.next_payment_id = raw_id.saturating_add(1);
        let id = PaymentId::new(raw_id.to_string()).map_err(BackendError::decode)?;
        let upi = (!state.defer_qr_code).then(|| upi_url(amount.value(), &id));
        let payment = StoredPayment {
            id,
            amount: amount.value(),
            upi_url: upi,
            transaction_reference: None,
            state: PaymentState::Pending,
            rejected_reason: None,
        };
        let receipt = payment.to_receipt();
        state.payments.push(payment);
        Ok(receipt)
    }

    async fn submit_transaction(
        &self,
        payment_id: &PaymentId,
        reference: &TransactionReference,
    ) -> BackendResult<()> {
        let mut state = self.begin_mutation("submit_transaction")?;
        let payment = find_payment(&mut state, payment_id)?;
        ensure_pending(payment)?;
        if payment.transaction_reference.is_some() {
            return Err(BackendError::rejected(
                409,
                "Transaction reference already submitted",
            ));
        }
        payment.transaction_reference = Some(reference.as_str().to_owned());
        Ok(())
    }
}

#[async_trait]
impl<C> AdminBackend for InMemoryBackend<C>
where
    C: Clock + Send + Sync,
{
    async fn start_batch(&self, student_id: &StudentId) -> BackendResult<()> {
        let today = self.start_of_today();
        let mut state = self.begin_mutation("start_batch")?;
        if state.student_id.as_ref() != Some(student_id) {
            return Err(not_found("student"));
        }
        let catalogue = state.task_catalogue.clone();
        let internship = state
            .internship
            .as_mut()
            .ok_or_else(|| not_found("internship"))?;
        if internship.batch.status != BatchStatus::Pending {
            return Err(BackendError::rejected(409, "Batch already started"));
        }
        internship.batch.start_date = today;
        internship.batch.status = BatchStatus::Running;

        let mut assigned = Vec::with_capacity(catalogue.len());
        for (index, task) in catalogue.into_iter().enumerate() {
            let id = StudentTaskId::new(format!("{student_id}-{}", index.saturating_add(1)))
                .map_err(BackendError::decode)?;
            assigned.push(AssignedTask {
                id,
                task,
                status: AssignedTaskStatus::Pending,
                github_url: None,
                validation_result: None,
            });
        }
        state.tasks = assigned;
        Ok(())
    }

    async fn override_task(
        &self,
        student_task_id: &StudentTaskId,
        approved: bool,
    ) -> BackendResult<()> {
        let mut state = self.begin_mutation("override_task")?;
        let task = state
            .tasks
            .iter_mut()
            .find(|task| &task.id == student_task_id)
            .ok_or_else(|| not_found("student task"))?;
        task.status = if approved {
            AssignedTaskStatus::Approved
        } else {
            AssignedTaskStatus::Rejected
        };
        Ok(())
    }

    async fn approve_payment(&self, payment_id: &PaymentId) -> BackendResult<()> {
        let mut state = self.begin_mutation("approve_payment")?;
        let payment = find_payment(&mut state, payment_id)?;
        ensure_pending(payment)?;
        payment.state = PaymentState::Success;
        Ok(())
    }

    async fn reject_payment(
        &self,
        payment_id: &PaymentId,
        reason: &RejectionReason,
    ) -> BackendResult<()> {
        let mut state = self.begin_mutation("reject_payment")?;
        let payment = find_payment(&mut state, payment_id)?;
        ensure_pending(payment)?;
        payment.state = PaymentState::Failed;
        payment.rejected_reason = Some(reason.as_str().to_owned());
        Ok(())
    }
}
