//! Unit tests for the internship module.
//!
//! Tests are organised by concern: domain values, lifecycle derivation,
//! aggregation, and the payment, submission and admin services.
