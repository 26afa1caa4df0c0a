use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20260826_000001_init_database"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Member::Table)
                    .col(ColumnDef::new(Member::Guild).not_null().big_integer())
                    .col(ColumnDef::new(Member::Member).not_null().big_integer())
                    .col(
                        ColumnDef::new(Member::Xp)
                            .not_null()
                            .big_integer()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Member::Gmp)
                            .not_null()
                            .big_integer()
                            .default(0),
                    )
                    .col(ColumnDef::new(Member::Rank).not_null().string())
                    .col(
                        ColumnDef::new(Member::MessagesSent)
                            .not_null()
                            .big_integer()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Member::VoiceMinutes)
                            .not_null()
                            .big_integer()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Member::ReactionsGiven)
                            .not_null()
                            .big_integer()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Member::ReactionsReceived)
                            .not_null()
                            .big_integer()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Member::TacticalWordsUsed)
                            .not_null()
                            .big_integer()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Member::TotalTacticalWords)
                            .not_null()
                            .big_integer()
                            .default(0),
                    )
                    .col(ColumnDef::new(Member::LastDaily).string())
                    .col(
                        ColumnDef::new(Member::DailyStreak)
                            .not_null()
                            .integer()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Member::LastMessageTime)
                            .not_null()
                            .big_integer()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Member::Verified)
                            .not_null()
                            .boolean()
                            .default(false),
                    )
                    .primary_key(Index::create().col(Member::Guild).col(Member::Member))
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(BackupHistory::Table)
                    .col(
                        ColumnDef::new(BackupHistory::Id)
                            .primary_key()
                            .not_null()
                            .integer()
                            .auto_increment(),
                    )
                    .col(
                        ColumnDef::new(BackupHistory::SyncedAt)
                            .not_null()
                            .big_integer(),
                    )
                    .col(
                        ColumnDef::new(BackupHistory::GuildCount)
                            .not_null()
                            .integer(),
                    )
                    .col(
                        ColumnDef::new(BackupHistory::MemberCount)
                            .not_null()
                            .integer(),
                    )
                    .col(ColumnDef::new(BackupHistory::Status).not_null().string())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Member::Table)
                    .col(Member::Guild)
                    .col(Member::Xp)
                    .name("idx-member-guild-xp")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Member::Table)
                    .col(Member::Guild)
                    .col(Member::Gmp)
                    .name("idx-member-guild-gmp")
                    .to_owned(),
            )
            .await
    }
    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Member::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BackupHistory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Member {
    Table,
    Guild,
    #[iden = "member"]
    Member,
    Xp,
    Gmp,
    Rank,
    MessagesSent,
    VoiceMinutes,
    ReactionsGiven,
    ReactionsReceived,
    TacticalWordsUsed,
    TotalTacticalWords,
    LastDaily,
    DailyStreak,
    LastMessageTime,
    Verified,
}
#[derive(Iden)]
pub enum BackupHistory {
    Table,
    Id,
    SyncedAt,
    GuildCount,
    MemberCount,
    Status,
}
