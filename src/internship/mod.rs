//! Internship lifecycle orchestration.
//!
//! Aggregates a student's enrolment, tasks, completion summary, pricing and
//! payment record into a [`domain::Snapshot`], derives the lifecycle stage
//! and progress from it, and drives the certificate payment, repository
//! submission and admin override workflows. The module follows hexagonal
//! architecture:
//!
//! - Domain types and derivation rules in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
