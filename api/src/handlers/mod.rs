//! HTTP handlers
//!
//! Axum request handlers for the RPC methods.

pub mod groups;

pub use groups::{add_groups, get_group, get_group_list};
