//! Error types for internship domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing validated internship domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InternshipDomainError {
    /// An identifier was empty after trimming.
    #[error("{kind} identifier must not be empty")]
    EmptyIdentifier {
        /// Human-readable identifier kind.
        kind: &'static str,
    },

    /// The transaction reference is empty after trimming.
    #[error("transaction reference must not be empty")]
    EmptyTransactionReference,

    /// The rejection reason is empty after trimming.
    #[error("a reason is required to reject a payment")]
    EmptyRejectionReason,

    /// The payment amount is zero or negative.
    #[error("invalid payment amount {0}, expected a positive value")]
    InvalidAmount(String),

    /// The submitted repository URL is empty after trimming.
    #[error("repository URL must not be empty")]
    EmptyRepositoryUrl,

    /// The submitted repository URL does not point at a GitHub repository.
    #[error("invalid repository URL '{0}', expected https://github.com/<owner>/<repo>")]
    InvalidRepositoryUrl(String),
}

/// Error returned while parsing a wire-format enum value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseStatusError {
    /// Name of the enum being parsed.
    pub kind: &'static str,
    /// Raw value that failed to parse.
    pub value: String,
}

impl ParseStatusError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}
