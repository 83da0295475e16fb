//! Identifier types for the internship domain.
//!
//! The backend emits identifiers either as JSON numbers or as strings
//! depending on the resource, so every identifier is normalised to a trimmed
//! string on the way in.

use super::InternshipDomainError;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a validated identifier.
            ///
            /// # Errors
            ///
            /// Returns [`InternshipDomainError::EmptyIdentifier`] when the
            /// value is empty after trimming.
            pub fn new(value: impl Into<String>) -> Result<Self, InternshipDomainError> {
                let raw = value.into();
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(InternshipDomainError::EmptyIdentifier { kind: $kind });
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Returns the identifier as `str`.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = deserializer.deserialize_any(IdVisitor)?;
                Self::new(raw).map_err(de::Error::custom)
            }
        }
    };
}

string_id!(
    /// Identifier of a student account, as used by admin endpoints.
    StudentId,
    "student"
);

string_id!(
    /// Identifier of a task assignment belonging to one student.
    StudentTaskId,
    "student task"
);

string_id!(
    /// Identifier of a task template in the backend catalogue.
    TaskTemplateId,
    "task"
);

string_id!(
    /// Identifier of a certificate payment.
    PaymentId,
    "payment"
);

/// Accepts integer or string identifiers.
struct IdVisitor;

impl de::Visitor<'_> for IdVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an identifier string or integer")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(value.to_owned())
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }
}
