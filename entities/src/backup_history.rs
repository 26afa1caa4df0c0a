use sea_orm::entity::prelude::*;

/// Audit row written after every successful mirror push.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "backup_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub synced_at: i64,
    pub guild_count: i32,
    pub member_count: i32,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
