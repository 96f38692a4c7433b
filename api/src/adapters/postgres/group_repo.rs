//! PostgreSQL adapter for GroupRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Select, Set, SqlErr,
};
use uuid::Uuid;

use crate::domain::entities::{Group, GroupFilter, GroupId, NewGroup};
use crate::domain::ports::GroupRepository;
use crate::entity::groups;
use crate::error::StoreError;

/// Statements run by `ensure_schema`, each one idempotent
const SCHEMA_STATEMENTS: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS groups (
        id uuid PRIMARY KEY,
        name varchar(128) NOT NULL,
        semester_start timestamptz NOT NULL,
        semester_end timestamptz NOT NULL,
        is_first_week_numerator boolean NOT NULL,
        department varchar(5) NOT NULL,
        faculty varchar(5) NOT NULL,
        created_at timestamptz NOT NULL DEFAULT now(),
        updated_at timestamptz NOT NULL DEFAULT now(),
        deleted_at timestamptz NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_groups_deleted_at ON groups (deleted_at)",
    // Names are unique among live groups only
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_groups_name_live ON groups (name) WHERE deleted_at IS NULL",
];

/// PostgreSQL implementation of GroupRepository
pub struct PostgresGroupRepository {
    pub(super) db: DatabaseConnection,
}

impl PostgresGroupRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open a connection pool for the given DSN
    pub async fn connect(dsn: &str) -> Result<Self, StoreError> {
        let db = Database::connect(dsn)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self::new(db))
    }

    /// Create the groups table and its indexes if they are missing
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA_STATEMENTS {
            self.db
                .execute_unprepared(statement)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        Ok(())
    }

    /// Close the connection pool
    pub async fn close(&self) -> Result<(), StoreError> {
        self.db
            .clone()
            .close()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

/// Base query over live groups narrowed by the filter's set fields
fn live_groups(filter: &GroupFilter) -> Select<groups::Entity> {
    let mut query = groups::Entity::find().filter(groups::Column::DeletedAt.is_null());

    if let Some(id) = filter.id {
        query = query.filter(groups::Column::Id.eq(id.0));
    }
    if let Some(name) = filter.name.as_deref() {
        query = query.filter(groups::Column::Name.eq(name));
    }
    if let Some(department) = filter.department.as_deref() {
        query = query.filter(groups::Column::Department.eq(department));
    }
    if let Some(faculty) = filter.faculty.as_deref() {
        query = query.filter(groups::Column::Faculty.eq(faculty));
    }

    query
}

fn map_db_err(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::Duplicate(detail),
        _ => StoreError::Database(err.to_string()),
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_one(&self, filter: &GroupFilter) -> Result<Option<Group>, StoreError> {
        let result = live_groups(filter)
            .order_by_asc(groups::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_many(&self, filter: &GroupFilter) -> Result<Vec<Group>, StoreError> {
        let results = live_groups(filter)
            .order_by_asc(groups::Column::CreatedAt)
            .order_by_asc(groups::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn insert(&self, group: &NewGroup) -> Result<GroupId, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now().fixed_offset();

        let model = groups::ActiveModel {
            id: Set(id),
            name: Set(group.name.clone()),
            semester_start: Set(group.semester_start.fixed_offset()),
            semester_end: Set(group.semester_end.fixed_offset()),
            is_first_week_numerator: Set(group.is_first_week_numerator),
            department: Set(group.department.clone()),
            faculty: Set(group.faculty.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let result = model.insert(&self.db).await.map_err(map_db_err)?;

        Ok(GroupId(result.id))
    }
}

/// Convert SeaORM model to domain entity
impl From<groups::Model> for Group {
    fn from(model: groups::Model) -> Self {
        Group {
            id: GroupId(model.id),
            name: model.name,
            semester_start: model.semester_start.with_timezone(&Utc),
            semester_end: model.semester_end.with_timezone(&Utc),
            is_first_week_numerator: model.is_first_week_numerator,
            department: model.department,
            faculty: model.faculty,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
            deleted_at: model.deleted_at.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}
