//! Internflow: client-side orchestration of the internship lifecycle.
//!
//! This crate loads everything a student's dashboard needs from the
//! internship-management REST API, derives where the student stands
//! (batch started, progress, lifecycle stage, next payment step), and runs
//! the certificate payment, repository submission and admin override
//! workflows against it.
//!
//! # Architecture
//!
//! Internflow follows hexagonal architecture principles:
//!
//! - **Domain**: Wire records and pure lifecycle rules
//! - **Ports**: Abstract trait interfaces for the backend and session
//! - **Adapters**: HTTP and in-memory implementations of the ports
//!
//! # Modules
//!
//! - [`internship`]: Snapshot aggregation, lifecycle derivation and workflows
//! - [`config`]: Backend settings read from the environment
//! - [`telemetry`]: Tracing subscriber setup for binaries

pub mod config;
pub mod internship;
pub mod telemetry;
