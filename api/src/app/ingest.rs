//! Batch group registration
//!
//! Candidates are validated and persisted one at a time, in order. Every
//! candidate gets exactly one result regardless of what happened to the
//! others, and nothing is rolled back when a later candidate fails.

use std::collections::HashSet;

use thiserror::Error;
use tokio::sync::watch;

use super::GroupService;
use crate::domain::entities::{
    parse_semester_timestamp, GroupFilter, GroupId, NewGroup, GROUP_DEPARTMENT_MAX_LENGTH,
    GROUP_FACULTY_MAX_LENGTH, GROUP_NAME_MAX_LENGTH, SEMESTER_TIMESTAMP_FORMAT,
};
use crate::domain::ports::GroupRepository;
use crate::error::{build_error, wrap_error, AppError, ErrorKind, Status, StoreError};

/// A group submitted for registration, as received from the client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupCandidate {
    pub name: String,
    pub semester_start: String,
    pub semester_end: String,
    pub is_first_week_numerator: bool,
    pub department: String,
    pub faculty: String,
}

/// Outcome for one candidate of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResult {
    pub accepted: bool,
    /// Empty when accepted
    pub error: String,
}

impl ItemResult {
    fn accepted() -> Self {
        Self {
            accepted: true,
            error: String::new(),
        }
    }

    fn rejected(reason: &Rejection) -> Self {
        Self {
            accepted: false,
            error: reason.to_string(),
        }
    }
}

/// Why a candidate was not registered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("group name must not be empty")]
    EmptyName,

    #[error("group name must be at most {GROUP_NAME_MAX_LENGTH} characters")]
    NameTooLong,

    #[error("group with this name already exists")]
    DuplicateName,

    #[error("invalid semester start, expected {SEMESTER_TIMESTAMP_FORMAT}")]
    InvalidSemesterStart,

    #[error("invalid semester end, expected {SEMESTER_TIMESTAMP_FORMAT}")]
    InvalidSemesterEnd,

    #[error("semester start must not be after semester end")]
    SemesterOrder,

    #[error("department must be at most {GROUP_DEPARTMENT_MAX_LENGTH} characters")]
    DepartmentTooLong,

    #[error("faculty must be at most {GROUP_FACULTY_MAX_LENGTH} characters")]
    FacultyTooLong,

    #[error("request cancelled before this group was processed")]
    Cancelled,

    /// Store failure, carrying only the masked client text
    #[error("{}", .0.message())]
    Store(Status),
}

/// Shutdown signal observed between batch candidates
#[derive(Debug, Clone)]
pub struct CancelSignal(watch::Receiver<bool>);

impl CancelSignal {
    pub fn new(receiver: watch::Receiver<bool>) -> Self {
        Self(receiver)
    }

    /// Signal that never fires
    #[cfg(test)]
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self(rx)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }
}

/// First validation step, run before the duplicate lookup
pub fn check_name(name: &str) -> Result<(), Rejection> {
    if name.is_empty() {
        return Err(Rejection::EmptyName);
    }
    if name.chars().count() > GROUP_NAME_MAX_LENGTH {
        return Err(Rejection::NameTooLong);
    }
    Ok(())
}

/// Remaining validation steps, run after the duplicate lookup
///
/// Checks run in order and the first failure wins.
pub fn validate_candidate(candidate: &GroupCandidate) -> Result<NewGroup, Rejection> {
    let semester_start = parse_semester_timestamp(&candidate.semester_start)
        .ok_or(Rejection::InvalidSemesterStart)?;
    let semester_end = parse_semester_timestamp(&candidate.semester_end)
        .ok_or(Rejection::InvalidSemesterEnd)?;

    if semester_start > semester_end {
        return Err(Rejection::SemesterOrder);
    }
    if candidate.department.chars().count() > GROUP_DEPARTMENT_MAX_LENGTH {
        return Err(Rejection::DepartmentTooLong);
    }
    if candidate.faculty.chars().count() > GROUP_FACULTY_MAX_LENGTH {
        return Err(Rejection::FacultyTooLong);
    }

    Ok(NewGroup {
        name: candidate.name.clone(),
        semester_start,
        semester_end,
        is_first_week_numerator: candidate.is_first_week_numerator,
        department: candidate.department.clone(),
        faculty: candidate.faculty.clone(),
    })
}

impl<GR> GroupService<GR>
where
    GR: GroupRepository,
{
    /// Register a batch of groups
    ///
    /// Fails only when the batch is empty. Otherwise returns one result per
    /// candidate in input order. Once `cancel` fires, the candidates not yet
    /// processed are reported as cancelled without touching the store.
    pub async fn add_groups(
        &self,
        candidates: &[GroupCandidate],
        cancel: &CancelSignal,
    ) -> Result<Vec<ItemResult>, AppError> {
        if candidates.is_empty() {
            return Err(
                build_error(ErrorKind::InvalidArgument, "groups list must not be empty").into(),
            );
        }

        let mut results = Vec::with_capacity(candidates.len());
        // Names accepted earlier in this batch
        let mut accepted_names = HashSet::new();

        for (index, candidate) in candidates.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::warn!(
                    processed = index,
                    total = candidates.len(),
                    "Group batch cancelled"
                );
                results.extend(
                    std::iter::repeat(ItemResult::rejected(&Rejection::Cancelled))
                        .take(candidates.len() - index),
                );
                break;
            }

            match self.add_one(candidate, &accepted_names).await {
                Ok(id) => {
                    tracing::debug!(index, group_id = %id, name = %candidate.name, "Group registered");
                    accepted_names.insert(candidate.name.clone());
                    results.push(ItemResult::accepted());
                }
                Err(reason) => {
                    tracing::debug!(index, name = %candidate.name, reason = %reason, "Group rejected");
                    results.push(ItemResult::rejected(&reason));
                }
            }
        }

        let accepted = results.iter().filter(|r| r.accepted).count();
        tracing::info!(
            total = candidates.len(),
            accepted,
            rejected = candidates.len() - accepted,
            "Processed group batch"
        );

        Ok(results)
    }

    async fn add_one(
        &self,
        candidate: &GroupCandidate,
        accepted_names: &HashSet<String>,
    ) -> Result<GroupId, Rejection> {
        check_name(&candidate.name)?;

        if accepted_names.contains(&candidate.name) {
            return Err(Rejection::DuplicateName);
        }
        let existing = self
            .groups
            .find_one(&GroupFilter::by_name(&candidate.name))
            .await
            .map_err(|e| {
                let err = wrap_error(ErrorKind::Internal, "failed to check group name", e);
                Rejection::Store(err.into())
            })?;
        if existing.is_some() {
            return Err(Rejection::DuplicateName);
        }

        let group = validate_candidate(candidate)?;

        self.groups.insert(&group).await.map_err(|e| {
            let err = match e {
                // Lost a race with a concurrent batch
                StoreError::Duplicate(detail) => wrap_error(
                    ErrorKind::AlreadyExists,
                    Rejection::DuplicateName.to_string(),
                    detail,
                ),
                e => wrap_error(ErrorKind::Internal, "failed to save group", e),
            };
            Rejection::Store(err.into())
        })
    }
}
