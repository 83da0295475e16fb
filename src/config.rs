//! Backend connection settings read from the environment.
//!
//! | Variable                  | Required | Default | Description                     |
//! |---------------------------|----------|---------|---------------------------------|
//! | `INTERNFLOW_API_URL`      | yes      | --      | Base URL of the REST API        |
//! | `INTERNFLOW_TOKEN`        | no       | --      | Bearer token for the session    |
//! | `INTERNFLOW_TIMEOUT_SECS` | no       | `15`    | Per-request timeout in seconds  |

use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the API base URL.
pub const API_URL_VAR: &str = "INTERNFLOW_API_URL";
/// Environment variable holding the bearer token.
pub const TOKEN_VAR: &str = "INTERNFLOW_TOKEN";
/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_VAR: &str = "INTERNFLOW_TIMEOUT_SECS";

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    /// The base URL does not use an HTTP scheme.
    #[error("{var} must start with http:// or https://, got '{0}'", var = API_URL_VAR)]
    InvalidUrl(String),
    /// The timeout is not a positive whole number of seconds.
    #[error("{var} must be a positive integer, got '{0}'", var = TIMEOUT_VAR)]
    InvalidTimeout(String),
}

/// Settings for reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Bearer token, when a session exists.
    pub token: Option<String>,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
}

impl BackendConfig {
    /// Creates a configuration with the default timeout and no token.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is missing or malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let base_url = read(API_URL_VAR).ok_or(ConfigError::Missing(API_URL_VAR))?;
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(base_url));
        }

        let request_timeout = match read(TIMEOUT_VAR) {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
        };

        let mut config = Self::new(base_url);
        config.token = read(TOKEN_VAR);
        config.request_timeout = request_timeout;
        Ok(config)
    }
}
