//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities and ports.

pub mod group_service;
pub mod ingest;

pub use group_service::{GroupService, GroupView};
pub use ingest::{CancelSignal, GroupCandidate, ItemResult};
