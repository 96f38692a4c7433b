//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod group;

pub use group::{
    format_semester_timestamp, parse_semester_timestamp, Group, GroupFilter, GroupId, NewGroup,
    GROUP_DEPARTMENT_MAX_LENGTH, GROUP_FACULTY_MAX_LENGTH, GROUP_NAME_MAX_LENGTH,
    SEMESTER_TIMESTAMP_FORMAT,
};
