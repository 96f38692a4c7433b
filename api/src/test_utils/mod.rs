//! Test utilities
//!
//! In-memory group store and fixtures for unit and router tests.
//!
//! The store is hand-written rather than generated: tests flip its failure
//! switches to reach the store error paths.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
