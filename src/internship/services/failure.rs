//! Classification of operation failures for user-facing messages.

use crate::internship::ports::BackendError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad cause of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The caller's input, the current state or missing credentials made the
    /// request invalid; no request was sent.
    InvalidInput,
    /// The server received the request and refused it.
    ServerRejected,
    /// The server could not be reached.
    Network,
}

impl FailureKind {
    /// Classifies a backend error.
    #[must_use]
    pub const fn of_backend(error: &BackendError) -> Self {
        match error {
            BackendError::Network(_) => Self::Network,
            BackendError::Unauthenticated => Self::InvalidInput,
            BackendError::Rejected { .. } | BackendError::Decode(_) => Self::ServerRejected,
        }
    }

    /// Returns a short heading for the failure.
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::InvalidInput => "Your input was invalid",
            Self::ServerRejected => "The server rejected the operation",
            Self::Network => "The network request failed",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

/// Renders a backend error for display next to the attempted action.
#[must_use]
pub fn backend_message(error: &BackendError) -> String {
    match error {
        BackendError::Rejected { message, .. } => message.clone(),
        BackendError::Unauthenticated => "Please sign in again.".to_owned(),
        BackendError::Network(_) => {
            "Could not reach the server. Check your connection and try again.".to_owned()
        }
        BackendError::Decode(_) => "The server sent an unexpected response.".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{FailureKind, backend_message};
    use crate::internship::ports::BackendError;
    use rstest::rstest;
    use std::io;

    #[rstest]
    #[case::unsent_without_credentials(BackendError::Unauthenticated, FailureKind::InvalidInput)]
    #[case::refused(BackendError::rejected(401, "Unauthorized"), FailureKind::ServerRejected)]
    #[case::undecodable(
        BackendError::decode(io::Error::other("expected JSON")),
        FailureKind::ServerRejected
    )]
    #[case::unreachable(
        BackendError::network(io::Error::other("connection refused")),
        FailureKind::Network
    )]
    fn backend_errors_are_classified(#[case] error: BackendError, #[case] expected: FailureKind) {
        assert_eq!(FailureKind::of_backend(&error), expected);
    }

    #[test]
    fn missing_credentials_ask_the_user_to_sign_in() {
        let error = BackendError::Unauthenticated;
        assert_eq!(
            format!("{}: {}", FailureKind::of_backend(&error), backend_message(&error)),
            "Your input was invalid: Please sign in again."
        );
    }
}
