//! Step definitions for end-to-end lifecycle scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
