//! SeaORM Entity for users table

use sea_orm::entity::prelude::*;

/// `role_id` granting site-wide moderation rights.
pub const ROLE_SUPER_ADMIN: i32 = 1;
/// `role_id` given to every registered account.
pub const ROLE_MEMBER: i32 = 2;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub password: String,
    pub role_id: i32,
    pub is_hidden: bool,
    pub created_at: DateTime,
    pub last_active_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ambassadors::Entity")]
    Ambassadors,
    #[sea_orm(has_one = "super::account_settings::Entity")]
    AccountSettings,
}

impl Related<super::ambassadors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ambassadors.def()
    }
}

impl Related<super::account_settings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountSettings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
