//! Internship enrolment and batch scheduling types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheduling status of a batch as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    /// The batch has been created but tasks are not yet assigned.
    Pending,
    /// The batch is running and tasks are assigned.
    Running,
    /// The batch has finished.
    Completed,
}

impl BatchStatus {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cohort of students sharing start and end dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    /// First day of the batch.
    pub start_date: DateTime<Utc>,
    /// Last moment of the batch.
    pub end_date: DateTime<Utc>,
    /// Deadline for paying the certificate fee, when one has been set.
    #[serde(default)]
    pub payment_deadline: Option<DateTime<Utc>>,
    /// Current scheduling status.
    pub status: BatchStatus,
}

impl Batch {
    /// Returns `true` when `start_date <= end_date`.
    #[must_use]
    pub fn has_valid_range(&self) -> bool {
        self.start_date <= self.end_date
    }
}

/// A student's internship enrolment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Internship {
    /// Internship domain name, joined against domain pricing.
    pub domain: String,
    /// Duration in days.
    pub duration: u32,
    /// Batch the student belongs to.
    pub batch: Batch,
}
