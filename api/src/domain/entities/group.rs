//! Group domain entity
//!
//! Represents an academic group (cohort) registered in the directory.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum group name length, in characters
pub const GROUP_NAME_MAX_LENGTH: usize = 128;
/// Maximum department code length, in characters
pub const GROUP_DEPARTMENT_MAX_LENGTH: usize = 5;
/// Maximum faculty code length, in characters
pub const GROUP_FACULTY_MAX_LENGTH: usize = GROUP_DEPARTMENT_MAX_LENGTH;

/// Human-readable name of the semester timestamp format, used in client messages
pub const SEMESTER_TIMESTAMP_FORMAT: &str = "RFC 3339 (e.g. 2024-09-01T00:00:00Z)";

/// Unique identifier for a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub Uuid);

impl GroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for GroupId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GroupId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A persisted group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub semester_start: DateTime<Utc>,
    pub semester_end: DateTime<Utc>,
    pub is_first_week_numerator: bool,
    pub department: String,
    pub faculty: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Group {
    /// Logically removed groups are invisible to every lookup
    #[cfg(test)]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Data needed to create a new group, already validated
#[derive(Debug, Clone, PartialEq)]
pub struct NewGroup {
    pub name: String,
    pub semester_start: DateTime<Utc>,
    pub semester_end: DateTime<Utc>,
    pub is_first_week_numerator: bool,
    pub department: String,
    pub faculty: String,
}

/// Sparse filter over groups
///
/// Unset fields are wildcards, set fields must match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupFilter {
    pub id: Option<GroupId>,
    pub name: Option<String>,
    pub department: Option<String>,
    pub faculty: Option<String>,
}

impl GroupFilter {
    pub fn by_id(id: GroupId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Check a group against the filter, soft-deleted groups never match
    #[cfg(test)]
    pub fn matches(&self, group: &Group) -> bool {
        !group.is_deleted()
            && self.id.map_or(true, |id| id == group.id)
            && self.name.as_deref().map_or(true, |n| n == group.name)
            && self
                .department
                .as_deref()
                .map_or(true, |d| d == group.department)
            && self.faculty.as_deref().map_or(true, |f| f == group.faculty)
    }
}

/// Parse a semester boundary sent by a client
///
/// Strict RFC 3339: the date and time must be joined by `T`, chrono alone
/// also accepts a space there.
pub fn parse_semester_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if !matches!(value.as_bytes().get(10), Some(b'T' | b't')) {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a semester boundary for a client
pub fn format_semester_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}
