//! Test utilities
//!
//! Fixtures and hand-written doubles for unit testing.
//!
//! Doubles wrap the in-memory adapters to count calls or inject failures.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
