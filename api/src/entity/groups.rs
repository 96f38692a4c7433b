use sea_orm::entity::prelude::*;

/// Group database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "String(StringLen::N(128))")]
    pub name: String,

    pub semester_start: DateTimeWithTimeZone,

    pub semester_end: DateTimeWithTimeZone,

    pub is_first_week_numerator: bool,

    #[sea_orm(column_type = "String(StringLen::N(5))")]
    pub department: String,

    #[sea_orm(column_type = "String(StringLen::N(5))")]
    pub faculty: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    /// Set when the group is logically removed
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
