//! Concurrent snapshot aggregation with per-resource fault isolation.

use crate::internship::{
    domain::{
        AssignedTask, DomainPricing, Internship, PaymentReceipt, PaymentStatus, Snapshot,
        TaskStatusSummary,
    },
    ports::{BackendError, BackendResource, BackendResult, StudentBackend},
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// A resource whose fetch failed during an aggregation pass.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    /// The resource that could not be loaded.
    pub resource: BackendResource,
    /// Why the fetch failed.
    pub error: BackendError,
}

/// Result of one aggregation pass.
#[derive(Debug, Clone)]
pub struct AggregationOutcome {
    /// The merged snapshot.
    pub snapshot: Snapshot,
    /// Per-resource failures; their fields kept the previous value.
    pub failures: Vec<FetchFailure>,
}

impl AggregationOutcome {
    /// Returns `true` when `resource` failed in this pass.
    #[must_use]
    pub fn failed(&self, resource: BackendResource) -> bool {
        self.failures
            .iter()
            .any(|failure| failure.resource == resource)
    }
}

/// Raw results of the five concurrent fetches.
#[derive(Debug)]
struct FetchResults {
    internship: BackendResult<Option<Internship>>,
    assigned_tasks: BackendResult<Vec<AssignedTask>>,
    task_status: BackendResult<TaskStatusSummary>,
    domains: BackendResult<Vec<DomainPricing>>,
    payment_status: BackendResult<PaymentStatus>,
}

impl FetchResults {
    /// Applies each success to `snapshot` and collects the failures.
    fn merge_into(self, snapshot: &mut Snapshot) -> Vec<FetchFailure> {
        let mut failures = Vec::new();
        let mut record = |resource: BackendResource, error: BackendError| {
            warn!(resource = resource.as_str(), error = %error, "resource fetch failed");
            failures.push(FetchFailure { resource, error });
        };

        match self.internship {
            Ok(internship) => snapshot.apply_internship(internship),
            Err(error) => record(BackendResource::Internship, error),
        }
        match self.assigned_tasks {
            Ok(tasks) => snapshot.apply_assigned_tasks(tasks),
            Err(error) => record(BackendResource::AssignedTasks, error),
        }
        match self.task_status {
            Ok(summary) => snapshot.apply_task_status(summary),
            Err(error) => record(BackendResource::TaskStatus, error),
        }
        match self.domains {
            Ok(domains) => snapshot.apply_domain_pricing(domains),
            Err(error) => record(BackendResource::Domains, error),
        }
        match self.payment_status {
            Ok(payment) => snapshot.apply_payment_status(payment),
            Err(error) => record(BackendResource::PaymentStatus, error),
        }
        failures
    }
}

#[derive(Debug, Default)]
struct AggregatorState {
    applied_sequence: u64,
    snapshot: Snapshot,
}

/// Something that can reload a student's snapshot on demand.
#[async_trait]
pub trait SnapshotRefresher: Send + Sync {
    /// Reloads every resource and returns the resulting snapshot.
    async fn refresh(&self) -> Snapshot;

    /// Returns the most recently applied snapshot without fetching.
    fn current(&self) -> Snapshot;
}

/// Loads the five student resources concurrently and merges them into a
/// shared snapshot.
///
/// Passes are numbered when they start. A pass finishing after a later pass
/// has already been applied is discarded, so the snapshot never regresses
/// to older data.
pub struct SnapshotAggregator<B>
where
    B: StudentBackend,
{
    backend: Arc<B>,
    next_sequence: AtomicU64,
    state: RwLock<AggregatorState>,
}

impl<B> SnapshotAggregator<B>
where
    B: StudentBackend,
{
    /// Creates an aggregator with an empty snapshot.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_snapshot(backend, Snapshot::empty())
    }

    /// Creates an aggregator seeded with `snapshot`.
    #[must_use]
    pub fn with_snapshot(backend: Arc<B>, snapshot: Snapshot) -> Self {
        Self {
            backend,
            next_sequence: AtomicU64::new(0),
            state: RwLock::new(AggregatorState {
                applied_sequence: 0,
                snapshot,
            }),
        }
    }

    /// Returns the backend the aggregator reads from.
    #[must_use]
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Fetches every resource once and merges the results into `previous`.
    ///
    /// Never fails as a whole: a failed fetch leaves its field at the value
    /// in `previous` and is reported in [`AggregationOutcome::failures`].
    /// The shared snapshot is not touched.
    pub async fn load(&self, previous: &Snapshot) -> AggregationOutcome {
        let results = self.fetch_all().await;
        let mut snapshot = previous.clone();
        let failures = results.merge_into(&mut snapshot);
        AggregationOutcome { snapshot, failures }
    }

    /// Runs one aggregation pass against the shared snapshot.
    ///
    /// Returns the shared snapshot after the pass, together with this
    /// pass's failures. When a newer pass has already been applied, this
    /// pass's results are dropped.
    pub async fn refresh_with_failures(&self) -> AggregationOutcome {
        let sequence = self
            .next_sequence
            .fetch_add(1, Ordering::SeqCst)
            .saturating_add(1);
        let results = self.fetch_all().await;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if sequence < state.applied_sequence {
            debug!(
                sequence,
                applied = state.applied_sequence,
                "discarding stale aggregation pass"
            );
            return AggregationOutcome {
                snapshot: state.snapshot.clone(),
                failures: Vec::new(),
            };
        }
        let failures = results.merge_into(&mut state.snapshot);
        state.applied_sequence = sequence;
        debug!(sequence, failed = failures.len(), "applied aggregation pass");
        AggregationOutcome {
            snapshot: state.snapshot.clone(),
            failures,
        }
    }

    /// Runs one aggregation pass and returns the current best-effort
    /// snapshot.
    pub async fn refresh(&self) -> Snapshot {
        self.refresh_with_failures().await.snapshot
    }

    /// Records the payment named by an initiation receipt as the pending
    /// payment.
    ///
    /// The receipt counts as a pass of its own, so an older pass finishing
    /// afterwards cannot replace it. A record already pending under the same
    /// id is kept as it is.
    pub fn record_pending_payment(&self, receipt: &PaymentReceipt) -> Snapshot {
        let sequence = self
            .next_sequence
            .fetch_add(1, Ordering::SeqCst)
            .saturating_add(1);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let known = state
            .snapshot
            .payment_status
            .as_ref()
            .is_some_and(|payment| payment.is_pending(&receipt.payment_id));
        if !known {
            state
                .snapshot
                .apply_payment_status(PaymentStatus::pending_from(receipt));
        }
        state.applied_sequence = state.applied_sequence.max(sequence);
        debug!(sequence, payment_id = %receipt.payment_id, "recorded pending payment");
        state.snapshot.clone()
    }

    /// Returns the most recently applied snapshot.
    #[must_use]
    pub fn current(&self) -> Snapshot {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .clone()
    }

    async fn fetch_all(&self) -> FetchResults {
        let backend = &self.backend;
        let (internship, assigned_tasks, task_status, domains, payment_status) = tokio::join!(
            backend.internship_details(),
            backend.assigned_tasks(),
            backend.task_status(),
            backend.domains(),
            backend.payment_status(),
        );
        FetchResults {
            internship,
            assigned_tasks,
            task_status,
            domains,
            payment_status,
        }
    }
}

#[async_trait]
impl<B> SnapshotRefresher for SnapshotAggregator<B>
where
    B: StudentBackend,
{
    async fn refresh(&self) -> Snapshot {
        Self::refresh(self).await
    }

    fn current(&self) -> Snapshot {
        Self::current(self)
    }
}
