//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use async_trait::async_trait;

use crate::domain::entities::{Group, GroupFilter, GroupId, NewGroup};
use crate::error::StoreError;

/// Repository for Group entities
///
/// Soft-deleted groups are invisible to every method.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Find the first group matching the filter, `None` when nothing matches
    async fn find_one(&self, filter: &GroupFilter) -> Result<Option<Group>, StoreError>;

    /// Find every group matching the filter
    async fn find_many(&self, filter: &GroupFilter) -> Result<Vec<Group>, StoreError>;

    /// Persist a new group and return its generated identifier
    async fn insert(&self, group: &NewGroup) -> Result<GroupId, StoreError>;
}
