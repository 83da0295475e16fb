//! In-memory adapters for the internship lifecycle.

mod backend;

pub use backend::{InMemoryBackend, InMemoryBackendBuilder};
