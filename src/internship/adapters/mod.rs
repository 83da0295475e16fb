//! Adapter implementations of the internship ports.
//!
//! - [`http`]: `reqwest`-based client for the deployed backend
//! - [`memory`]: in-memory backend used by tests and local demos

pub mod http;
pub mod memory;
