//! Certificate payment records and validated payment inputs.

use super::{InternshipDomainError, ParseStatusError, PaymentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Lifecycle state of the student's certificate payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    /// No payment has been initiated.
    #[default]
    None,
    /// A payment is awaiting settlement and admin review.
    Pending,
    /// The payment was approved; the certificate is unlocked.
    Success,
    /// The payment was rejected by an administrator.
    Failed,
}

impl PaymentState {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PaymentState {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "PENDING" => Ok(Self::Pending),
            "SUCCESS" => Ok(Self::Success),
            "FAILED" => Ok(Self::Failed),
            _ => Err(ParseStatusError::new("payment status", value)),
        }
    }
}

/// Current payment record as reported by `GET /payment/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    /// Lifecycle state.
    pub status: PaymentState,
    /// Payment identifier once initiated.
    #[serde(default)]
    pub payment_id: Option<PaymentId>,
    /// Amount due.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// UPI deep link for the QR code, once generated.
    #[serde(default)]
    pub upi_url: Option<String>,
    /// Reference submitted by the student after paying.
    #[serde(default)]
    pub transaction_reference: Option<String>,
    /// Reason given by the administrator on rejection.
    #[serde(default)]
    pub rejected_reason: Option<String>,
}

impl PaymentStatus {
    /// Returns a record for a student with no payment.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns the pending record described by an initiation receipt.
    #[must_use]
    pub fn pending_from(receipt: &PaymentReceipt) -> Self {
        Self {
            status: PaymentState::Pending,
            payment_id: Some(receipt.payment_id.clone()),
            amount: Some(receipt.amount),
            upi_url: receipt.upi_url.clone(),
            ..Self::none()
        }
    }

    /// Returns `true` when this record is the pending payment `payment_id`.
    #[must_use]
    pub fn is_pending(&self, payment_id: &PaymentId) -> bool {
        self.status == PaymentState::Pending && self.payment_id.as_ref() == Some(payment_id)
    }

    /// Returns `true` when a non-blank transaction reference is recorded.
    #[must_use]
    pub fn has_transaction_reference(&self) -> bool {
        self.transaction_reference
            .as_deref()
            .is_some_and(|reference| !reference.trim().is_empty())
    }
}

/// Response of `POST /payment/initiate`.
///
/// While a payment is pending the backend returns the existing record, so
/// the same identifier may be received more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    /// Canonical pending payment identifier.
    pub payment_id: PaymentId,
    /// Amount due.
    pub amount: Decimal,
    /// UPI deep link, absent while the QR code is still generating.
    #[serde(default)]
    pub upi_url: Option<String>,
}

/// Positive amount to be paid for a certificate.
///
/// Serialised as a JSON number, which is what the payment endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentAmount(Decimal);

impl PaymentAmount {
    /// Creates a validated amount.
    ///
    /// # Errors
    ///
    /// Returns [`InternshipDomainError::InvalidAmount`] when the value is
    /// zero or negative.
    pub fn new(value: Decimal) -> Result<Self, InternshipDomainError> {
        if value <= Decimal::ZERO {
            return Err(InternshipDomainError::InvalidAmount(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Returns the underlying decimal value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl Serialize for PaymentAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl fmt::Display for PaymentAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trimmed, non-empty bank transaction reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionReference(String);

impl TransactionReference {
    /// Creates a validated transaction reference.
    ///
    /// # Errors
    ///
    /// Returns [`InternshipDomainError::EmptyTransactionReference`] when the
    /// value is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, InternshipDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InternshipDomainError::EmptyTransactionReference);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the reference as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Trimmed, non-empty reason attached to a payment rejection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RejectionReason(String);

impl RejectionReason {
    /// Creates a validated rejection reason.
    ///
    /// # Errors
    ///
    /// Returns [`InternshipDomainError::EmptyRejectionReason`] when the
    /// value is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, InternshipDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InternshipDomainError::EmptyRejectionReason);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the reason as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
