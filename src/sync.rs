//! Periodic push of the JSON store into a remote Postgres mirror.
//!
//! The mirror is an off-site backup, never the source of truth: the bot
//! reads nothing back from it, and a failed push is logged and retried on
//! the next tick.

use crate::store::{now_epoch, MemberRecord, Store};
use entities::{backup_history, member, prelude::*};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    DatabaseConnection, DbErr, EntityTrait,
};
use sea_query::OnConflict;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{error, info};

// 15 columns per row; stays well under the Postgres bind parameter limit.
const INSERT_CHUNK: usize = 1000;

pub async fn run(store: Arc<Store>, url: String, interval: Duration) {
    let db = match sea_orm::Database::connect(&url).await {
        Ok(db) => db,
        Err(err) => {
            error!("mirror database unavailable, remote sync disabled: {err}");
            return;
        }
    };
    if let Err(err) = Migrator::up(&db, None).await {
        error!("mirror migration failed, remote sync disabled: {err}");
        return;
    }
    info!("remote sync task started");
    loop {
        time::sleep(interval).await;
        match sync_once(&db, &store).await {
            Ok((guilds, members)) => {
                info!("mirrored {members} member(s) across {guilds} guild(s)");
            }
            Err(err) => error!("remote sync failed: {err}"),
        }
    }
}

#[allow(clippy::cast_possible_wrap)]
fn member_row(guild: u64, id: u64, record: &MemberRecord) -> member::ActiveModel {
    member::ActiveModel {
        guild: Set(guild as i64),
        member: Set(id as i64),
        xp: Set(record.xp as i64),
        gmp: Set(record.gmp),
        rank: Set(record.rank.clone()),
        messages_sent: Set(record.messages_sent as i64),
        voice_minutes: Set(record.voice_minutes as i64),
        reactions_given: Set(record.reactions_given as i64),
        reactions_received: Set(record.reactions_received as i64),
        tactical_words_used: Set(record.tactical_words_used as i64),
        total_tactical_words: Set(record.total_tactical_words as i64),
        last_daily: Set(record.last_daily.clone()),
        daily_streak: Set(record.daily_streak as i32),
        last_message_time: Set(record.last_message_time.unwrap_or(0) as i64),
        verified: Set(record.verified),
    }
}

async fn sync_once(db: &DatabaseConnection, store: &Store) -> Result<(usize, usize), DbErr> {
    let snapshot = store.snapshot().await;
    let rows: Vec<member::ActiveModel> = snapshot
        .guilds
        .iter()
        .flat_map(|(guild, members)| {
            members
                .iter()
                .map(|(id, record)| member_row(*guild, *id, record))
        })
        .collect();
    let member_count = rows.len();
    let guild_count = snapshot.guilds.len();

    for chunk in rows.chunks(INSERT_CHUNK) {
        Member::insert_many(chunk.to_vec())
            .on_conflict(
                OnConflict::columns([member::Column::Guild, member::Column::Member])
                    .update_columns([
                        member::Column::Xp,
                        member::Column::Gmp,
                        member::Column::Rank,
                        member::Column::MessagesSent,
                        member::Column::VoiceMinutes,
                        member::Column::ReactionsGiven,
                        member::Column::ReactionsReceived,
                        member::Column::TacticalWordsUsed,
                        member::Column::TotalTacticalWords,
                        member::Column::LastDaily,
                        member::Column::DailyStreak,
                        member::Column::LastMessageTime,
                        member::Column::Verified,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    let audit = backup_history::ActiveModel {
        id: NotSet,
        synced_at: Set(now_epoch() as i64),
        guild_count: Set(guild_count as i32),
        member_count: Set(member_count as i32),
        status: Set(String::from("success")),
    };
    BackupHistory::insert(audit).exec_without_returning(db).await?;
    Ok((guild_count, member_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_row_preserves_counters() {
        let record = MemberRecord {
            xp: 4200,
            gmp: 1337,
            messages_sent: 99,
            total_tactical_words: 12,
            daily_streak: 4,
            verified: true,
            ..MemberRecord::default()
        };
        let row = member_row(5, 7, &record);
        assert_eq!(row.guild, Set(5));
        assert_eq!(row.member, Set(7));
        assert_eq!(row.xp, Set(4200));
        assert_eq!(row.gmp, Set(1337));
        assert_eq!(row.messages_sent, Set(99));
        assert_eq!(row.total_tactical_words, Set(12));
        assert_eq!(row.daily_streak, Set(4));
        assert_eq!(row.verified, Set(true));
    }
}
