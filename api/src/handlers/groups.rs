//! Group handlers
//!
//! RPC methods of the group directory. Every error leaving these handlers is
//! a taxonomy `Status`, so no store detail reaches the caller.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::app::{GroupCandidate, GroupView, ItemResult};
use crate::domain::ports::GroupRepository;
use crate::error::{build_error, to_status, ErrorKind, Status};
use crate::AppState;

/// Request for a single group, by identifier or by name
#[derive(Debug, Default, Deserialize)]
pub struct GetGroupRequest {
    pub group_id: Option<String>,
    pub group_name: Option<String>,
}

/// Request for a filtered group list
#[derive(Debug, Default, Deserialize)]
pub struct GetGroupListRequest {
    pub department: Option<String>,
    pub faculty: Option<String>,
}

/// Response for listing groups
#[derive(Debug, Serialize)]
pub struct GetGroupListResponse {
    pub groups_list: Vec<GroupView>,
}

/// A group submitted for registration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddGroupsItem {
    pub group_name: String,
    pub semester_start_at: String,
    pub semester_end_at: String,
    pub is_first_week_numerator: bool,
    pub department: String,
    pub faculty: String,
}

impl From<AddGroupsItem> for GroupCandidate {
    fn from(item: AddGroupsItem) -> Self {
        GroupCandidate {
            name: item.group_name,
            semester_start: item.semester_start_at,
            semester_end: item.semester_end_at,
            is_first_week_numerator: item.is_first_week_numerator,
            department: item.department,
            faculty: item.faculty,
        }
    }
}

/// Request to register a batch of groups
#[derive(Debug, Default, Deserialize)]
pub struct AddGroupsRequest {
    pub groups_list: Option<Vec<AddGroupsItem>>,
}

/// Outcome for one submitted group, aligned with the request by position
#[derive(Debug, Serialize)]
pub struct AddGroupsResult {
    pub accepted: bool,
    pub error: String,
}

impl From<ItemResult> for AddGroupsResult {
    fn from(result: ItemResult) -> Self {
        AddGroupsResult {
            accepted: result.accepted,
            error: result.error,
        }
    }
}

/// Response for registering groups
#[derive(Debug, Serialize)]
pub struct AddGroupsResponse {
    pub results_list: Vec<AddGroupsResult>,
}

fn invalid_body(rejection: JsonRejection) -> Status {
    build_error(
        ErrorKind::InvalidArgument,
        format!("invalid request body: {}", rejection.body_text()),
    )
    .into()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// POST /GroupService/GetGroup
///
/// A non-empty identifier takes priority over the name.
pub async fn get_group<GR>(
    State(state): State<AppState<GR>>,
    payload: Result<Json<GetGroupRequest>, JsonRejection>,
) -> Result<Json<GroupView>, Status>
where
    GR: GroupRepository + 'static,
{
    let Json(request) = payload.map_err(invalid_body)?;

    let group = if let Some(id) = non_empty(request.group_id.as_deref()) {
        to_status(state.group_service.get_by_id(id).await)?
    } else if let Some(name) = non_empty(request.group_name.as_deref()) {
        to_status(state.group_service.get_by_name(name).await)?
    } else {
        return Err(build_error(
            ErrorKind::InvalidArgument,
            "expected group name or group identifier",
        )
        .into());
    };

    Ok(Json(group))
}

/// POST /GroupService/GetGroupList
///
/// List groups by department and faculty, both optional.
pub async fn get_group_list<GR>(
    State(state): State<AppState<GR>>,
    payload: Result<Json<GetGroupListRequest>, JsonRejection>,
) -> Result<Json<GetGroupListResponse>, Status>
where
    GR: GroupRepository + 'static,
{
    let Json(request) = payload.map_err(invalid_body)?;

    let groups_list = to_status(
        state
            .group_service
            .get_list(
                request.department.as_deref().unwrap_or_default(),
                request.faculty.as_deref().unwrap_or_default(),
            )
            .await,
    )?;

    Ok(Json(GetGroupListResponse { groups_list }))
}

/// POST /GroupService/AddGroups
///
/// Register a batch of groups, one result per submitted group.
pub async fn add_groups<GR>(
    State(state): State<AppState<GR>>,
    payload: Result<Json<AddGroupsRequest>, JsonRejection>,
) -> Result<Json<AddGroupsResponse>, Status>
where
    GR: GroupRepository + 'static,
{
    let Json(request) = payload.map_err(invalid_body)?;

    let candidates: Vec<GroupCandidate> = request
        .groups_list
        .ok_or_else(|| build_error(ErrorKind::InvalidArgument, "expected groups list"))?
        .into_iter()
        .map(GroupCandidate::from)
        .collect();

    let results = to_status(
        state
            .group_service
            .add_groups(&candidates, &state.cancel)
            .await,
    )?;

    Ok(Json(AddGroupsResponse {
        results_list: results.into_iter().map(AddGroupsResult::from).collect(),
    }))
}
