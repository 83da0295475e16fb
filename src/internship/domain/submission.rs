//! Repository submission values.

use super::{AssignedTask, InternshipDomainError};
use serde::{Deserialize, Serialize};

const GITHUB_PREFIX: &str = "https://github.com/";

/// Validated GitHub repository URL for task submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GithubRepoUrl(String);

impl GithubRepoUrl {
    /// Creates a validated repository URL.
    ///
    /// Accepts `https://github.com/<owner>/<repo>` with an optional trailing
    /// slash or `.git` suffix.
    ///
    /// # Errors
    ///
    /// Returns [`InternshipDomainError::EmptyRepositoryUrl`] for blank input
    /// and [`InternshipDomainError::InvalidRepositoryUrl`] otherwise.
    pub fn new(value: impl Into<String>) -> Result<Self, InternshipDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InternshipDomainError::EmptyRepositoryUrl);
        }

        let Some(path) = trimmed.strip_prefix(GITHUB_PREFIX) else {
            return Err(InternshipDomainError::InvalidRepositoryUrl(raw));
        };
        let without_slash = path.trim_end_matches('/');
        let repo_path = without_slash.strip_suffix(".git").unwrap_or(without_slash);
        let mut segments = repo_path.split('/');
        let owner = segments.next().unwrap_or_default();
        let repo = segments.next().unwrap_or_default();
        let is_valid = !owner.is_empty()
            && !repo.is_empty()
            && segments.next().is_none()
            && !trimmed.chars().any(char::is_whitespace);
        if !is_valid {
            return Err(InternshipDomainError::InvalidRepositoryUrl(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the URL as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What the snapshot knows about the student's repository submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "url", rename_all = "snake_case")]
pub enum SubmissionProjection {
    /// The task list has never been fetched successfully.
    #[default]
    Unknown,
    /// Tasks were fetched and none carries a repository URL.
    NotSubmitted,
    /// The representative submitted repository URL.
    Submitted(String),
}

impl SubmissionProjection {
    /// Projects a freshly fetched task list.
    ///
    /// Only the first task is consulted: all tasks share one repository.
    #[must_use]
    pub fn from_tasks(tasks: &[AssignedTask]) -> Self {
        tasks
            .first()
            .and_then(|task| task.github_url.as_deref())
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map_or(Self::NotSubmitted, |url| Self::Submitted(url.to_owned()))
    }

    /// Returns the submitted URL, if known.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Submitted(url) => Some(url),
            Self::Unknown | Self::NotSubmitted => None,
        }
    }
}
