//! Shared builders and a settable clock for integration tests.

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Local, Utc};
use internflow::internship::domain::{
    AssignedTask, AssignedTaskStatus, Batch, BatchStatus, DomainPricing, Internship,
    StudentTaskId, TaskDefinition, TaskTemplateId,
};
use mockable::Clock;
use rust_decimal::Decimal;

/// Domain every scenario student is enrolled in.
pub const DOMAIN: &str = "Web Development";

/// Clock whose instant can be moved by scenario steps.
#[derive(Debug)]
pub struct ScenarioClock {
    now: RwLock<DateTime<Utc>>,
}

impl ScenarioClock {
    /// Creates a clock frozen at `now`.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) = now;
    }
}

impl Clock for ScenarioClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Parses an RFC 3339 timestamp.
pub fn utc(timestamp: &str) -> eyre::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(timestamp)?.with_timezone(&Utc))
}

/// Running batch covering January 2024.
pub fn january_batch() -> Batch {
    Batch {
        start_date: utc("2024-01-01T00:00:00Z").expect("valid start"),
        end_date: utc("2024-01-31T23:59:59Z").expect("valid end"),
        payment_deadline: None,
        status: BatchStatus::Running,
    }
}

/// Batch created for February 2024 whose tasks are not yet assigned.
pub fn february_batch() -> Batch {
    Batch {
        start_date: utc("2024-02-01T00:00:00Z").expect("valid start"),
        end_date: utc("2024-02-29T23:59:59Z").expect("valid end"),
        payment_deadline: None,
        status: BatchStatus::Pending,
    }
}

/// Enrolment in [`DOMAIN`] for `batch`.
pub fn enrolment(batch: Batch) -> Internship {
    Internship {
        domain: DOMAIN.to_owned(),
        duration: 30,
        batch,
    }
}

/// Catalogue task number `number`.
pub fn definition(number: usize) -> TaskDefinition {
    TaskDefinition {
        id: TaskTemplateId::new(format!("t-{number}")).expect("valid template id"),
        title: format!("Task {number}"),
        level: "BEGINNER".to_owned(),
        description: format!("Build feature {number}"),
        requirements: Vec::new(),
        expected_output: "A working repository".to_owned(),
    }
}

/// `total` assigned tasks, the first `approved` of them approved and the
/// rest still pending.
pub fn assigned_tasks(total: usize, approved: usize) -> Vec<AssignedTask> {
    (1..=total)
        .map(|number| AssignedTask {
            id: StudentTaskId::new(format!("st-{number}")).expect("valid task id"),
            task: definition(number),
            status: if number <= approved {
                AssignedTaskStatus::Approved
            } else {
                AssignedTaskStatus::Pending
            },
            github_url: None,
            validation_result: None,
        })
        .collect()
}

/// Pricing table with a 499 certificate for [`DOMAIN`].
pub fn pricing() -> Vec<DomainPricing> {
    vec![DomainPricing {
        name: DOMAIN.to_owned(),
        durations: vec![30, 60],
        certificate_price: Decimal::new(499, 0),
    }]
}
