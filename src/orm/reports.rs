//! SeaORM Entity for reports table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub item_type: String,
    pub item_id: i32,
    pub forum_id: Option<i32>,
    pub thread_id: Option<i32>,
    pub community_id: Option<i32>,
    pub reported_user_id: Option<i32>,
    pub reporter_id: i32,
    pub reason_code: String,
    pub reason_text: Option<String>,
    pub severity: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub details: Option<String>,
    pub status: String,
    pub resolved_by: Option<i32>,
    pub resolved_at: Option<DateTime>,
    #[sea_orm(column_type = "Text", nullable)]
    pub resolution_notes: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ReporterId",
        to = "super::users::Column::Id"
    )]
    Reporter,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ResolvedBy",
        to = "super::users::Column::Id"
    )]
    Resolver,
}

impl ActiveModelBehavior for ActiveModel {}
