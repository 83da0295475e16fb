//! Assigned task records and the server-side completion summary.

use super::{StudentTaskId, TaskTemplateId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review status of an assigned task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignedTaskStatus {
    /// Assigned, nothing submitted yet.
    Pending,
    /// A repository has been submitted.
    Submitted,
    /// Automated validation is running.
    Validating,
    /// Accepted by validation or by an administrator.
    Approved,
    /// Rejected by validation or by an administrator.
    Rejected,
}

impl AssignedTaskStatus {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Submitted => "SUBMITTED",
            Self::Validating => "VALIDATING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for AssignedTaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalogue description of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    /// Catalogue identifier.
    pub id: TaskTemplateId,
    /// Short title.
    pub title: String,
    /// Difficulty level label.
    pub level: String,
    /// Long-form description.
    pub description: String,
    /// Checklist the submission must satisfy.
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Description of the expected deliverable.
    #[serde(default)]
    pub expected_output: String,
}

/// A task assigned to the current student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedTask {
    /// Assignment identifier.
    pub id: StudentTaskId,
    /// Catalogue task.
    pub task: TaskDefinition,
    /// Review status.
    pub status: AssignedTaskStatus,
    /// Submitted repository URL, if any.
    #[serde(default)]
    pub github_url: Option<String>,
    /// Opaque validation report produced by the backend.
    #[serde(default)]
    pub validation_result: Option<serde_json::Value>,
}

/// Server-side completion summary for the current student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusSummary {
    /// Number of assigned tasks.
    pub total_tasks: u32,
    /// Number of approved tasks.
    pub approved_tasks: u32,
    /// Whether every assigned task is approved.
    pub all_approved: bool,
}

/// Ways in which a [`TaskStatusSummary`] can contradict itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryInconsistency {
    /// More tasks are approved than exist.
    #[error("summary reports {approved} approved tasks out of {total}")]
    ApprovedExceedsTotal {
        /// Reported approved count.
        approved: u32,
        /// Reported total count.
        total: u32,
    },
    /// `all_approved` disagrees with the counts.
    #[error("summary flag allApproved={flag} contradicts {approved}/{total} approved")]
    AllApprovedMismatch {
        /// Reported flag value.
        flag: bool,
        /// Reported approved count.
        approved: u32,
        /// Reported total count.
        total: u32,
    },
}

impl TaskStatusSummary {
    /// Builds a summary from assigned tasks.
    #[must_use]
    pub fn from_tasks(tasks: &[AssignedTask]) -> Self {
        let total = u32::try_from(tasks.len()).unwrap_or(u32::MAX);
        let approved = u32::try_from(
            tasks
                .iter()
                .filter(|task| task.status == AssignedTaskStatus::Approved)
                .count(),
        )
        .unwrap_or(u32::MAX);
        Self {
            total_tasks: total,
            approved_tasks: approved,
            all_approved: total > 0 && approved == total,
        }
    }

    /// Checks the summary invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`SummaryInconsistency`] found.
    pub const fn validate(&self) -> Result<(), SummaryInconsistency> {
        if self.approved_tasks > self.total_tasks {
            return Err(SummaryInconsistency::ApprovedExceedsTotal {
                approved: self.approved_tasks,
                total: self.total_tasks,
            });
        }
        let expected = self.total_tasks > 0 && self.approved_tasks == self.total_tasks;
        if self.all_approved != expected {
            return Err(SummaryInconsistency::AllApprovedMismatch {
                flag: self.all_approved,
                approved: self.approved_tasks,
                total: self.total_tasks,
            });
        }
        Ok(())
    }

    /// Returns `true` only when the summary is consistent and reports every
    /// task approved.
    #[must_use]
    pub const fn trusted_all_approved(&self) -> bool {
        self.all_approved && self.validate().is_ok()
    }
}
