//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

use crate::domain::entities::{Group, GroupFilter, GroupId, NewGroup};
use crate::domain::ports::GroupRepository;
use crate::error::StoreError;

// ============================================================================
// In-Memory Group Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryGroupRepository {
    groups: Arc<RwLock<Vec<Group>>>,
    fail_reads: bool,
    fail_inserts: bool,
    duplicate_inserts: bool,
    cancel_after_insert: Option<watch::Sender<bool>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a group for testing
    pub fn with_group(self, group: Group) -> Self {
        self.groups.write().unwrap().push(group);
        self
    }

    /// Make `find_one` and `find_many` fail with a database error
    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Make `insert` fail with a database error
    pub fn failing_inserts(mut self) -> Self {
        self.fail_inserts = true;
        self
    }

    /// Make `insert` report a unique constraint violation
    pub fn duplicate_inserts(mut self) -> Self {
        self.duplicate_inserts = true;
        self
    }

    /// Fire `cancel` right after the first successful insert
    pub fn cancelling_after_insert(mut self, cancel: watch::Sender<bool>) -> Self {
        self.cancel_after_insert = Some(cancel);
        self
    }

    /// Number of live groups
    pub fn len(&self) -> usize {
        self.groups
            .read()
            .unwrap()
            .iter()
            .filter(|g| !g.is_deleted())
            .count()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.groups.read().unwrap().iter().any(|g| g.name == name)
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn find_one(&self, filter: &GroupFilter) -> Result<Option<Group>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Database("connection refused".to_string()));
        }
        let groups = self.groups.read().unwrap();
        Ok(groups.iter().find(|g| filter.matches(g)).cloned())
    }

    async fn find_many(&self, filter: &GroupFilter) -> Result<Vec<Group>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Database("connection refused".to_string()));
        }
        let groups = self.groups.read().unwrap();
        Ok(groups.iter().filter(|g| filter.matches(g)).cloned().collect())
    }

    async fn insert(&self, new_group: &NewGroup) -> Result<GroupId, StoreError> {
        if self.fail_inserts {
            return Err(StoreError::Database("disk full".to_string()));
        }
        if self.duplicate_inserts {
            return Err(StoreError::Duplicate(format!(
                "duplicate key value violates unique constraint \"idx_groups_name_live\": {}",
                new_group.name
            )));
        }

        let mut groups = self.groups.write().unwrap();
        if groups
            .iter()
            .any(|g| !g.is_deleted() && g.name == new_group.name)
        {
            return Err(StoreError::Duplicate(new_group.name.clone()));
        }

        let now = Utc::now();
        let group = Group {
            id: GroupId::new(),
            name: new_group.name.clone(),
            semester_start: new_group.semester_start,
            semester_end: new_group.semester_end,
            is_first_week_numerator: new_group.is_first_week_numerator,
            department: new_group.department.clone(),
            faculty: new_group.faculty.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let id = group.id;
        groups.push(group);
        if let Some(cancel) = &self.cancel_after_insert {
            let _ = cancel.send(true);
        }
        Ok(id)
    }
}
