//! SeaORM Entity for communities table

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "communities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Either "university" or "group".
    pub kind: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::forums::Entity")]
    Forums,
    #[sea_orm(has_many = "super::ambassadors::Entity")]
    Ambassadors,
}

impl Related<super::forums::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Forums.def()
    }
}

impl Related<super::ambassadors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ambassadors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
