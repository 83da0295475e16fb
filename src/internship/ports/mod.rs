//! Port contracts for the internship lifecycle.
//!
//! Ports define infrastructure-agnostic interfaces used by the services.

pub mod backend;
pub mod session;

pub use backend::{AdminBackend, BackendError, BackendResource, BackendResult, StudentBackend};
pub use session::{SessionProvider, StaticSession};
