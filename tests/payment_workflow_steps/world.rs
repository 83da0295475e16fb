//! Shared world state for payment workflow BDD scenarios.

use std::sync::Arc;

use crate::test_helpers::{ScenarioClock, utc};
use internflow::internship::{
    adapters::memory::InMemoryBackend,
    domain::{AssignedTask, Internship, LifecycleView, PaymentId, PaymentStatus},
    services::{PaymentWorkflowService, SnapshotAggregator, TaskSubmissionService},
};
use mockable::Clock;
use rstest::fixture;

/// Backend type used by the BDD world.
pub type ScenarioBackend = InMemoryBackend<ScenarioClock>;

/// Seed data collected by `Given` steps before the backend is built.
#[derive(Debug, Default)]
pub struct Seed {
    pub internship: Option<Internship>,
    pub tasks: Vec<AssignedTask>,
    pub payment: Option<PaymentStatus>,
}

/// Services wired against one seeded backend.
pub struct StudentSession {
    pub backend: Arc<ScenarioBackend>,
    pub aggregator: Arc<SnapshotAggregator<ScenarioBackend>>,
    pub payments: PaymentWorkflowService<ScenarioBackend, ScenarioClock>,
    pub submissions: TaskSubmissionService<ScenarioBackend, ScenarioClock>,
}

impl StudentSession {
    fn start(seed: &Seed, clock: &Arc<ScenarioClock>) -> Self {
        let mut builder = InMemoryBackend::builder()
            .assigned_tasks(seed.tasks.clone())
            .domains(crate::test_helpers::pricing())
            .next_payment_id(1);
        if let Some(internship) = seed.internship.clone() {
            builder = builder.internship(internship);
        }
        if let Some(payment) = seed.payment.clone() {
            builder = builder.payment(payment).next_payment_id(8);
        }
        let backend = Arc::new(builder.build_with_clock(Arc::clone(clock)));
        let aggregator = Arc::new(SnapshotAggregator::new(Arc::clone(&backend)));
        run_async(aggregator.refresh());
        Self {
            payments: PaymentWorkflowService::new(Arc::clone(&aggregator), Arc::clone(clock)),
            submissions: TaskSubmissionService::new(Arc::clone(&aggregator), Arc::clone(clock)),
            backend,
            aggregator,
        }
    }
}

/// Scenario world for payment and submission behaviour tests.
pub struct PaymentWorld {
    pub clock: Arc<ScenarioClock>,
    pub seed: Seed,
    session: Option<StudentSession>,
    pub initiated: Vec<PaymentId>,
    pub last_error: Option<String>,
}

impl PaymentWorld {
    /// Returns the running session, seeding the backend on first use.
    pub fn session(&mut self) -> &StudentSession {
        self.session
            .get_or_insert_with(|| StudentSession::start(&self.seed, &self.clock))
    }

    /// Derives the lifecycle view from the current snapshot.
    pub fn lifecycle(&mut self) -> LifecycleView {
        let now = self.clock.utc();
        let snapshot = self.session().aggregator.current();
        LifecycleView::derive(&snapshot, now)
    }

    /// Stores the user-facing message of a failed operation.
    pub fn record_failure(&mut self, message: String) {
        self.last_error = Some(message);
    }
}

impl Default for PaymentWorld {
    fn default() -> Self {
        let start = utc("2024-01-15T12:00:00Z").expect("valid default instant");
        Self {
            clock: Arc::new(ScenarioClock::starting_at(start)),
            seed: Seed::default(),
            session: None,
            initiated: Vec::new(),
            last_error: None,
        }
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> PaymentWorld {
    PaymentWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
