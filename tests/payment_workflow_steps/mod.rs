//! Step definitions for certificate payment and submission scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
