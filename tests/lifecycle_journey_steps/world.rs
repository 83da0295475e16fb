//! Shared world state for lifecycle journey BDD scenarios.

use std::collections::HashSet;
use std::sync::Arc;

use crate::test_helpers::{ScenarioClock, pricing, utc};
use internflow::internship::{
    adapters::memory::InMemoryBackend,
    domain::{AssignedTask, Internship, LifecycleView, StudentId, TaskDefinition},
    ports::BackendResource,
    services::{
        AdminOverrideService, AggregationOutcome, PaymentWorkflowService, SnapshotAggregator,
        TaskSubmissionService,
    },
};
use mockable::Clock;
use rstest::fixture;

/// Backend type used by the BDD world.
pub type ScenarioBackend = InMemoryBackend<ScenarioClock>;

/// Seed data collected by `Given` steps before the backend is built.
#[derive(Debug, Default)]
pub struct Seed {
    pub student_id: Option<StudentId>,
    pub internship: Option<Internship>,
    pub tasks: Vec<AssignedTask>,
    pub catalogue: Vec<TaskDefinition>,
    pub failing: HashSet<BackendResource>,
}

/// Student-side and admin-side services sharing one backend.
pub struct Journey {
    pub backend: Arc<ScenarioBackend>,
    pub dashboard: Arc<SnapshotAggregator<ScenarioBackend>>,
    pub payments: PaymentWorkflowService<ScenarioBackend, ScenarioClock>,
    pub submissions: TaskSubmissionService<ScenarioBackend, ScenarioClock>,
    pub admin: AdminOverrideService<ScenarioBackend>,
}

impl Journey {
    fn start(seed: &Seed, clock: &Arc<ScenarioClock>) -> Self {
        let mut builder = InMemoryBackend::builder()
            .assigned_tasks(seed.tasks.clone())
            .task_catalogue(seed.catalogue.clone())
            .domains(pricing());
        if let Some(student_id) = seed.student_id.clone() {
            builder = builder.student_id(student_id);
        }
        if let Some(internship) = seed.internship.clone() {
            builder = builder.internship(internship);
        }
        let backend = Arc::new(builder.build_with_clock(Arc::clone(clock)));
        for resource in &seed.failing {
            backend
                .set_read_failure(*resource, true)
                .expect("in-memory backend lock");
        }

        let dashboard = Arc::new(SnapshotAggregator::new(Arc::clone(&backend)));
        let attached = Arc::clone(&dashboard);
        Self {
            payments: PaymentWorkflowService::new(Arc::clone(&dashboard), Arc::clone(clock)),
            submissions: TaskSubmissionService::new(Arc::clone(&dashboard), Arc::clone(clock)),
            admin: AdminOverrideService::new(Arc::clone(&backend)).with_view(attached),
            backend,
            dashboard,
        }
    }
}

/// Scenario world for lifecycle journey behaviour tests.
pub struct JourneyWorld {
    pub clock: Arc<ScenarioClock>,
    pub seed: Seed,
    journey: Option<Journey>,
    pub last_refresh: Option<AggregationOutcome>,
}

impl JourneyWorld {
    /// Returns the running journey, seeding the backend and loading the
    /// dashboard on first use.
    pub fn journey(&mut self) -> &Journey {
        let clock = &self.clock;
        let seed = &self.seed;
        self.journey.get_or_insert_with(|| {
            let started = Journey::start(seed, clock);
            run_async(started.dashboard.refresh());
            started
        })
    }

    /// Derives the lifecycle view from the dashboard snapshot.
    pub fn lifecycle(&mut self) -> LifecycleView {
        let now = self.clock.utc();
        let snapshot = self.journey().dashboard.current();
        LifecycleView::derive(&snapshot, now)
    }
}

impl Default for JourneyWorld {
    fn default() -> Self {
        let start = utc("2024-01-15T09:30:00Z").expect("valid default instant");
        Self {
            clock: Arc::new(ScenarioClock::starting_at(start)),
            seed: Seed::default(),
            journey: None,
            last_refresh: None,
        }
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> JourneyWorld {
    JourneyWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
