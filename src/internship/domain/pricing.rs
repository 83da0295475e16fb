//! Reference pricing for internship domains.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pricing and duration options for one internship domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainPricing {
    /// Domain name as used by [`super::Internship::domain`].
    pub name: String,
    /// Offered durations in days.
    #[serde(default)]
    pub durations: Vec<u32>,
    /// Fee charged for the completion certificate.
    pub certificate_price: Decimal,
}

/// Looks up the certificate price for a domain name.
///
/// Matching ignores surrounding whitespace and ASCII case.
#[must_use]
pub fn certificate_price_for(domains: &[DomainPricing], domain: &str) -> Option<Decimal> {
    let wanted = domain.trim();
    domains
        .iter()
        .find(|pricing| pricing.name.trim().eq_ignore_ascii_case(wanted))
        .map(|pricing| pricing.certificate_price)
}
