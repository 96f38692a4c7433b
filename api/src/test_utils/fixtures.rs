//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::{TimeZone, Utc};

use crate::app::GroupCandidate;
use crate::domain::entities::{Group, GroupId};

/// Create a test group in department CS, faculty ENG, autumn 2024 semester
pub fn test_group(name: &str) -> Group {
    test_group_in(name, "CS", "ENG")
}

/// Create a test group with a specific department and faculty
pub fn test_group_in(name: &str, department: &str, faculty: &str) -> Group {
    let now = Utc::now();
    Group {
        id: GroupId::new(),
        name: name.to_string(),
        semester_start: Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap(),
        semester_end: Utc.with_ymd_and_hms(2024, 12, 20, 0, 0, 0).unwrap(),
        is_first_week_numerator: true,
        department: department.to_string(),
        faculty: faculty.to_string(),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

/// Create a valid candidate matching `test_group`
pub fn test_candidate(name: &str) -> GroupCandidate {
    GroupCandidate {
        name: name.to_string(),
        semester_start: "2024-09-01T00:00:00Z".to_string(),
        semester_end: "2024-12-20T00:00:00Z".to_string(),
        is_first_week_numerator: true,
        department: "CS".to_string(),
        faculty: "ENG".to_string(),
    }
}
