//! Session port supplying credentials to backend adapters.

/// Source of the bearer token attached to backend requests.
///
/// Implementations are injected into adapters at construction so no
/// adapter reads ambient session state.
pub trait SessionProvider: Send + Sync {
    /// Returns the current bearer token, if the user is signed in.
    fn bearer_token(&self) -> Option<String>;
}

/// Session with a fixed token, or none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSession {
    token: Option<String>,
}

impl StaticSession {
    /// Creates a session that always presents `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Creates a session with no credentials.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { token: None }
    }
}

impl SessionProvider for StaticSession {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}
