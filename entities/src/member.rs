use sea_orm::entity::prelude::*;

/// One row per member per guild, mirroring the authoritative JSON store.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "member")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub member: i64,
    pub xp: i64,
    pub gmp: i64,
    pub rank: String,
    pub messages_sent: i64,
    pub voice_minutes: i64,
    pub reactions_given: i64,
    pub reactions_received: i64,
    pub tactical_words_used: i64,
    pub total_tactical_words: i64,
    pub last_daily: Option<String>,
    pub daily_streak: i32,
    pub last_message_time: i64,
    pub verified: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
