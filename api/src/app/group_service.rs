//! Group service
//!
//! Lookup side of the group directory: single groups by name or identifier,
//! and filtered lists. Batch registration lives in `ingest`.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::entities::{format_semester_timestamp, Group, GroupFilter, GroupId};
use crate::domain::ports::GroupRepository;
use crate::error::{build_error, wrap_error, AppError, ErrorKind, ServiceError};

/// Client-facing projection of a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupView {
    pub group_id: String,
    pub group_name: String,
    /// RFC 3339, UTC
    pub semester_start_at: String,
    /// RFC 3339, UTC
    pub semester_end_at: String,
    pub is_first_week_numerator: bool,
    pub department: String,
    pub faculty: String,
}

impl From<&Group> for GroupView {
    fn from(group: &Group) -> Self {
        GroupView {
            group_id: group.id.to_string(),
            group_name: group.name.clone(),
            semester_start_at: format_semester_timestamp(&group.semester_start),
            semester_end_at: format_semester_timestamp(&group.semester_end),
            is_first_week_numerator: group.is_first_week_numerator,
            department: group.department.clone(),
            faculty: group.faculty.clone(),
        }
    }
}

/// Service for looking up and registering groups
pub struct GroupService<GR>
where
    GR: GroupRepository,
{
    pub(super) groups: Arc<GR>,
}

impl<GR> GroupService<GR>
where
    GR: GroupRepository,
{
    pub fn new(groups: Arc<GR>) -> Self {
        Self { groups }
    }

    /// Get a live group by its exact name
    pub async fn get_by_name(&self, name: &str) -> Result<GroupView, AppError> {
        if name.is_empty() {
            return Err(
                build_error(ErrorKind::InvalidArgument, "group name must not be empty").into(),
            );
        }

        let group = self.find_single(&GroupFilter::by_name(name)).await?;
        Ok(GroupView::from(&group))
    }

    /// Get a live group by its identifier in canonical string form
    pub async fn get_by_id(&self, id: &str) -> Result<GroupView, AppError> {
        let id: GroupId = id
            .parse()
            .map_err(|_| build_error(ErrorKind::InvalidArgument, "invalid group identifier"))?;
        if id.is_nil() {
            return Err(build_error(ErrorKind::InvalidArgument, "invalid group identifier").into());
        }

        let group = self.find_single(&GroupFilter::by_id(id)).await?;
        Ok(GroupView::from(&group))
    }

    /// List live groups, empty department or faculty match anything
    ///
    /// Nothing matching is an empty list, not an error.
    pub async fn get_list(
        &self,
        department: &str,
        faculty: &str,
    ) -> Result<Vec<GroupView>, AppError> {
        let filter = GroupFilter {
            department: non_empty(department),
            faculty: non_empty(faculty),
            ..Default::default()
        };

        let groups = self
            .groups
            .find_many(&filter)
            .await
            .map_err(|e| wrap_error(ErrorKind::Internal, "failed to load groups", e))?;

        Ok(groups.iter().map(GroupView::from).collect())
    }

    async fn find_single(&self, filter: &GroupFilter) -> Result<Group, ServiceError> {
        self.groups
            .find_one(filter)
            .await
            .map_err(|e| wrap_error(ErrorKind::Internal, "failed to load group", e))?
            .ok_or_else(|| build_error(ErrorKind::NotFound, "group not found"))
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
