//! Progression store: authoritative in-memory member records with JSON
//! persistence behind a swappable backend.
//!
//! All mutations go through a single `RwLock`, so the cooldown and
//! monotonic-XP invariants hold even on the multi-threaded runtime.
//! Persistence takes a snapshot under the read lock and writes outside it.

use crate::constants::{RankDef, DAILY_BONUS_REWARD, PERSISTED_SCHEMA_VERSION, RANKS, STARTING_GMP};
use crate::ranks::rank_for_xp;
use crate::rewards::{Grant, RewardPolicy};
use ahash::HashMap;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task;
use tokio::time;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("persist task aborted")]
    TaskAborted,
}

/// Seconds since the Unix epoch; the clock used for reward cooldowns.
pub fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

fn default_gmp() -> i64 {
    STARTING_GMP
}
fn default_rank() -> String {
    RANKS[0].name.to_string()
}
fn default_rank_icon() -> String {
    RANKS[0].icon.to_string()
}

/// One member's progression within one guild. Every field carries a serde
/// default so files written by older versions keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    #[serde(default)]
    pub xp: u64,
    #[serde(default = "default_gmp")]
    pub gmp: i64,
    #[serde(default = "default_rank")]
    pub rank: String,
    #[serde(default = "default_rank_icon")]
    pub rank_icon: String,
    #[serde(default)]
    pub messages_sent: u64,
    #[serde(default)]
    pub voice_minutes: u64,
    #[serde(default)]
    pub reactions_given: u64,
    #[serde(default)]
    pub reactions_received: u64,
    #[serde(default)]
    pub tactical_words_used: u64,
    #[serde(default)]
    pub total_tactical_words: u64,
    /// Epoch seconds of the last rewarded message; `None` until the first
    /// grant, so a brand-new member is never inside a cooldown window.
    #[serde(default)]
    pub last_message_time: Option<u64>,
    #[serde(default)]
    pub last_daily: Option<String>,
    #[serde(default)]
    pub daily_streak: u32,
    #[serde(default)]
    pub verified: bool,
}

impl Default for MemberRecord {
    fn default() -> Self {
        Self {
            xp: 0,
            gmp: STARTING_GMP,
            rank: default_rank(),
            rank_icon: default_rank_icon(),
            messages_sent: 0,
            voice_minutes: 0,
            reactions_given: 0,
            reactions_received: 0,
            tactical_words_used: 0,
            total_tactical_words: 0,
            last_message_time: None,
            last_daily: None,
            daily_streak: 0,
            verified: false,
        }
    }
}

type GuildMap = HashMap<u64, HashMap<u64, MemberRecord>>;

/// On-disk document. `version` is the reserved migration marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedData {
    #[serde(default = "schema_version")]
    pub version: u32,
    #[serde(default)]
    pub guilds: GuildMap,
}

const fn schema_version() -> u32 {
    PERSISTED_SCHEMA_VERSION
}

impl Default for PersistedData {
    fn default() -> Self {
        Self {
            version: PERSISTED_SCHEMA_VERSION,
            guilds: GuildMap::default(),
        }
    }
}

/// Where the store persists to. File today, anything else tomorrow.
pub trait Backend: Send + Sync {
    /// `Ok(None)` means nothing has been persisted yet.
    fn load(&self) -> Result<Option<PersistedData>, StoreError>;
    fn save(&self, data: &PersistedData) -> Result<(), StoreError>;
}

/// JSON file backend with a backup-copy, temp-file, rename write cycle.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }
}

impl Backend for JsonFileBackend {
    fn load(&self) -> Result<Option<PersistedData>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, data: &PersistedData) -> Result<(), StoreError> {
        if self.path.exists() {
            fs::copy(&self.path, self.sibling(".backup"))?;
        }
        let tmp = self.sibling(".tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            serde_json::to_writer_pretty(&mut file, data)?;
            file.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// What a single qualifying event changes on a record.
#[derive(Debug, Clone, Copy, Default)]
pub struct Delta {
    pub xp: u64,
    pub gmp: i64,
    pub activity: Option<Activity>,
}

#[derive(Debug, Clone, Copy)]
pub enum Activity {
    Message { tactical_words: u32 },
    Reaction,
    ReactionReceived,
    Voice { minutes: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    pub from: &'static RankDef,
    pub to: &'static RankDef,
}

#[derive(Debug, Clone)]
pub struct RewardOutcome {
    pub grant: Grant,
    pub record: MemberRecord,
    pub promotion: Option<Promotion>,
}

#[derive(Debug, Clone)]
pub enum DailyOutcome {
    Granted {
        xp: u64,
        gmp: i64,
        streak: u32,
        record: MemberRecord,
        promotion: Option<Promotion>,
    },
    AlreadyClaimed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardKey {
    Xp,
    Gmp,
    TacticalWords,
    Messages,
}

fn key_value(record: &MemberRecord, key: LeaderboardKey) -> u64 {
    match key {
        LeaderboardKey::Xp => record.xp,
        LeaderboardKey::Gmp => u64::try_from(record.gmp).unwrap_or(0),
        LeaderboardKey::TacticalWords => record.total_tactical_words,
        LeaderboardKey::Messages => record.messages_sent,
    }
}

/// Applies a delta in place. GMP is clamped at zero; XP only grows.
fn apply_to_record(record: &mut MemberRecord, delta: &Delta) -> Option<Promotion> {
    match delta.activity {
        Some(Activity::Message { tactical_words }) => {
            record.messages_sent += 1;
            record.tactical_words_used += u64::from(tactical_words);
            record.total_tactical_words += u64::from(tactical_words);
        }
        Some(Activity::Reaction) => record.reactions_given += 1,
        Some(Activity::ReactionReceived) => record.reactions_received += 1,
        Some(Activity::Voice { minutes }) => record.voice_minutes += minutes,
        None => {}
    }
    let old_rank = rank_for_xp(record.xp);
    record.xp += delta.xp;
    record.gmp = record.gmp.saturating_add(delta.gmp).max(0);
    let new_rank = rank_for_xp(record.xp);
    record.rank = new_rank.name.to_string();
    record.rank_icon = new_rank.icon.to_string();
    (old_rank.name != new_rank.name).then_some(Promotion {
        from: old_rank,
        to: new_rank,
    })
}

pub struct Store {
    guilds: RwLock<GuildMap>,
    backend: Arc<dyn Backend>,
    dirty: AtomicBool,
}

impl Store {
    /// Loads persisted data through the backend. A malformed document is
    /// logged and replaced by an empty store; the data-loss risk is accepted
    /// rather than masked.
    pub fn open(backend: Arc<dyn Backend>) -> Self {
        let mut data = match backend.load() {
            Ok(Some(data)) => {
                info!("loaded progression data for {} guild(s)", data.guilds.len());
                data
            }
            Ok(None) => {
                info!("no progression data found, starting fresh");
                PersistedData::default()
            }
            Err(err) => {
                warn!("malformed progression data, starting with an empty store: {err}");
                PersistedData::default()
            }
        };
        let repaired = repair_ranks(&mut data.guilds);
        Self {
            guilds: RwLock::new(data.guilds),
            backend,
            dirty: AtomicBool::new(repaired),
        }
    }

    /// Current record for a member, provisioning a default one if absent.
    pub async fn get(&self, guild: u64, member: u64) -> MemberRecord {
        let mut guilds = self.guilds.write().await;
        let members = guilds.entry(guild).or_default();
        if let Some(record) = members.get(&member) {
            return record.clone();
        }
        debug!("created record for member {member} in guild {guild}");
        self.dirty.store(true, Ordering::Release);
        members.entry(member).or_default().clone()
    }

    pub async fn apply(&self, guild: u64, member: u64, delta: &Delta) -> Option<Promotion> {
        let mut guilds = self.guilds.write().await;
        let record = guilds.entry(guild).or_default().entry(member).or_default();
        let promotion = apply_to_record(record, delta);
        self.dirty.store(true, Ordering::Release);
        promotion
    }

    /// Runs the reward policy and applies the grant in one critical section,
    /// so two near-simultaneous messages cannot both pass the cooldown.
    pub async fn grant_message_reward(
        &self,
        guild: u64,
        member: u64,
        now: u64,
        text: &str,
        policy: &RewardPolicy,
    ) -> Option<RewardOutcome> {
        let mut guilds = self.guilds.write().await;
        let record = guilds.entry(guild).or_default().entry(member).or_default();
        let grant = policy.evaluate(record.last_message_time, now, text)?;
        record.last_message_time = Some(now);
        let promotion = apply_to_record(
            record,
            &Delta {
                xp: grant.xp,
                gmp: grant.gmp,
                activity: Some(Activity::Message {
                    tactical_words: grant.tactical_words,
                }),
            },
        );
        self.dirty.store(true, Ordering::Release);
        Some(RewardOutcome {
            grant,
            record: record.clone(),
            promotion,
        })
    }

    /// Awards the daily bonus at most once per UTC day, maintaining the
    /// consecutive-day streak.
    pub async fn claim_daily(&self, guild: u64, member: u64, today: NaiveDate) -> DailyOutcome {
        let today_key = today.format("%Y-%m-%d").to_string();
        let mut guilds = self.guilds.write().await;
        let record = guilds.entry(guild).or_default().entry(member).or_default();
        if record.last_daily.as_deref() == Some(today_key.as_str()) {
            return DailyOutcome::AlreadyClaimed;
        }
        record.daily_streak = match record
            .last_daily
            .as_deref()
            .and_then(|last| NaiveDate::parse_from_str(last, "%Y-%m-%d").ok())
            .map(|last| (today - last).num_days())
        {
            Some(1) => record.daily_streak + 1,
            _ => 1,
        };
        record.last_daily = Some(today_key);
        let promotion = apply_to_record(
            record,
            &Delta {
                xp: DAILY_BONUS_REWARD.xp,
                gmp: DAILY_BONUS_REWARD.gmp,
                activity: None,
            },
        );
        self.dirty.store(true, Ordering::Release);
        DailyOutcome::Granted {
            xp: DAILY_BONUS_REWARD.xp,
            gmp: DAILY_BONUS_REWARD.gmp,
            streak: record.daily_streak,
            record: record.clone(),
            promotion,
        }
    }

    pub async fn mark_verified(&self, guild: u64, member: u64) {
        let mut guilds = self.guilds.write().await;
        guilds
            .entry(guild)
            .or_default()
            .entry(member)
            .or_default()
            .verified = true;
        self.dirty.store(true, Ordering::Release);
    }

    /// Top members of a guild by `key`, descending; members with no recorded
    /// activity are excluded.
    pub async fn leaderboard(
        &self,
        guild: u64,
        key: LeaderboardKey,
        limit: usize,
    ) -> Vec<(u64, MemberRecord)> {
        let guilds = self.guilds.read().await;
        let Some(members) = guilds.get(&guild) else {
            return Vec::new();
        };
        let mut entries: Vec<(u64, MemberRecord)> = members
            .iter()
            .filter(|(_, record)| record.messages_sent > 0 || record.xp > 0)
            .map(|(id, record)| (*id, record.clone()))
            .collect();
        entries.sort_by_key(|(_, record)| std::cmp::Reverse(key_value(record, key)));
        entries.truncate(limit);
        entries
    }

    /// Clone of the full mapping, taken under the read lock.
    pub async fn snapshot(&self) -> PersistedData {
        PersistedData {
            version: PERSISTED_SCHEMA_VERSION,
            guilds: self.guilds.read().await.clone(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Serializes the full mapping through the backend. Failures leave the
    /// in-memory state authoritative and the dirty flag set.
    pub async fn persist(&self) -> Result<(), StoreError> {
        // Clear before snapshotting: a mutation racing the write re-marks
        // dirty instead of being silently counted as flushed.
        self.dirty.store(false, Ordering::Release);
        let snapshot = self.snapshot().await;
        let backend = Arc::clone(&self.backend);
        let outcome = match task::spawn_blocking(move || backend.save(&snapshot)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::TaskAborted),
        };
        if outcome.is_err() {
            self.dirty.store(true, Ordering::Release);
        }
        outcome
    }

    /// Periodic flush of dirty state to the backend.
    pub async fn flush_loop(self: Arc<Self>, interval: Duration) {
        loop {
            time::sleep(interval).await;
            if !self.is_dirty() {
                continue;
            }
            match self.persist().await {
                Ok(()) => info!("member data saved"),
                Err(err) => error!("error saving member data: {err}"),
            }
        }
    }
}

/// Rewrites derived rank fields after load so stale files self-correct.
fn repair_ranks(guilds: &mut GuildMap) -> bool {
    let mut repaired = false;
    for members in guilds.values_mut() {
        for record in members.values_mut() {
            let rank = rank_for_xp(record.xp);
            if record.rank != rank.name || record.rank_icon != rank.icon {
                record.rank = rank.name.to_string();
                record.rank_icon = rank.icon.to_string();
                repaired = true;
            }
        }
    }
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MESSAGE_REWARD, TACTICAL_WORD_REWARD, VOICE_MINUTE_REWARD};
    use std::sync::Mutex;

    struct MemoryBackend {
        data: Mutex<Option<PersistedData>>,
    }

    impl MemoryBackend {
        fn empty() -> Arc<Self> {
            Arc::new(Self {
                data: Mutex::new(None),
            })
        }
    }

    impl Backend for MemoryBackend {
        fn load(&self) -> Result<Option<PersistedData>, StoreError> {
            Ok(self.data.lock().unwrap().clone())
        }
        fn save(&self, data: &PersistedData) -> Result<(), StoreError> {
            *self.data.lock().unwrap() = Some(data.clone());
            Ok(())
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("kira-store-{name}-{}", std::process::id()))
    }

    const POLICY: RewardPolicy = RewardPolicy::new(30, 10);

    #[tokio::test]
    async fn provisions_default_record() {
        let store = Store::open(MemoryBackend::empty());
        let record = store.get(1, 42).await;
        assert_eq!(record.xp, 0);
        assert_eq!(record.gmp, STARTING_GMP);
        assert_eq!(record.rank, "Rookie");
    }

    #[tokio::test]
    async fn cooldown_scenario_grants_then_blocks_then_grants() {
        let store = Store::open(MemoryBackend::empty());
        let first = store
            .grant_message_reward(1, 7, 0, "tactical stealth operation", &POLICY)
            .await
            .expect("first message rewards");
        assert_eq!(
            first.grant.xp,
            MESSAGE_REWARD.xp + 3 * TACTICAL_WORD_REWARD.xp
        );
        assert_eq!(store.get(1, 7).await.last_message_time, Some(0));

        let second = store.grant_message_reward(1, 7, 10, "tactical", &POLICY).await;
        assert!(second.is_none(), "inside cooldown");
        let blocked = store.get(1, 7).await;
        assert_eq!(blocked.xp, first.record.xp, "no change inside cooldown");

        let third = store.grant_message_reward(1, 7, 31, "hello", &POLICY).await;
        assert!(third.is_some(), "cooldown elapsed");
    }

    #[tokio::test]
    async fn voice_activity_accumulates_minutes() {
        let store = Store::open(MemoryBackend::empty());
        store
            .apply(
                1,
                7,
                &Delta {
                    xp: 3 * VOICE_MINUTE_REWARD.xp,
                    gmp: 3 * VOICE_MINUTE_REWARD.gmp,
                    activity: Some(Activity::Voice { minutes: 3 }),
                },
            )
            .await;
        let record = store.get(1, 7).await;
        assert_eq!(record.voice_minutes, 3);
        assert_eq!(record.xp, 3 * VOICE_MINUTE_REWARD.xp);
    }

    #[tokio::test]
    async fn failed_persist_keeps_store_dirty() {
        struct FailingBackend;
        impl Backend for FailingBackend {
            fn load(&self) -> Result<Option<PersistedData>, StoreError> {
                Ok(None)
            }
            fn save(&self, _: &PersistedData) -> Result<(), StoreError> {
                Err(StoreError::Io(std::io::Error::other("disk full")))
            }
        }

        let store = Store::open(Arc::new(FailingBackend));
        store
            .apply(
                1,
                7,
                &Delta {
                    xp: 10,
                    gmp: 0,
                    activity: None,
                },
            )
            .await;
        assert!(store.is_dirty());
        assert!(store.persist().await.is_err());
        assert!(store.is_dirty(), "failed flush must leave the flag set");
    }

    #[tokio::test]
    async fn gmp_never_goes_negative() {
        let store = Store::open(MemoryBackend::empty());
        store
            .apply(
                1,
                7,
                &Delta {
                    xp: 0,
                    gmp: -(STARTING_GMP + 5000),
                    activity: None,
                },
            )
            .await;
        assert_eq!(store.get(1, 7).await.gmp, 0);
    }

    #[tokio::test]
    async fn promotion_fires_on_threshold_crossing() {
        let store = Store::open(MemoryBackend::empty());
        let promotion = store
            .apply(
                1,
                7,
                &Delta {
                    xp: 100,
                    gmp: 0,
                    activity: None,
                },
            )
            .await
            .expect("crosses the Private floor");
        assert_eq!(promotion.from.name, "Rookie");
        assert_eq!(promotion.to.name, "Private");
        assert_eq!(store.get(1, 7).await.rank, "Private");
    }

    #[tokio::test]
    async fn daily_claims_once_per_day_and_tracks_streak() {
        let store = Store::open(MemoryBackend::empty());
        let day1 = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();
        let day5 = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();

        match store.claim_daily(1, 7, day1).await {
            DailyOutcome::Granted { streak, xp, .. } => {
                assert_eq!(streak, 1);
                assert_eq!(xp, DAILY_BONUS_REWARD.xp);
            }
            DailyOutcome::AlreadyClaimed => panic!("first claim must succeed"),
        }
        assert!(matches!(
            store.claim_daily(1, 7, day1).await,
            DailyOutcome::AlreadyClaimed
        ));
        match store.claim_daily(1, 7, day2).await {
            DailyOutcome::Granted { streak, .. } => assert_eq!(streak, 2),
            DailyOutcome::AlreadyClaimed => panic!("next day must succeed"),
        }
        match store.claim_daily(1, 7, day5).await {
            DailyOutcome::Granted { streak, .. } => assert_eq!(streak, 1, "gap resets streak"),
            DailyOutcome::AlreadyClaimed => panic!("later day must succeed"),
        }
    }

    #[tokio::test]
    async fn leaderboard_sorts_and_excludes_inactive() {
        let store = Store::open(MemoryBackend::empty());
        for (member, xp) in [(1u64, 50u64), (2, 500), (3, 5)] {
            store
                .apply(
                    9,
                    member,
                    &Delta {
                        xp,
                        gmp: 0,
                        activity: Some(Activity::Message { tactical_words: 0 }),
                    },
                )
                .await;
        }
        // Provisioned but inactive.
        store.get(9, 4).await;
        let top = store.leaderboard(9, LeaderboardKey::Xp, 10).await;
        assert_eq!(
            top.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            vec![2, 1, 3]
        );
        let top_two = store.leaderboard(9, LeaderboardKey::Xp, 2).await;
        assert_eq!(top_two.len(), 2);
    }

    #[tokio::test]
    async fn persist_then_load_round_trips() {
        let path = temp_path("roundtrip.json");
        let _ = fs::remove_file(&path);
        let backend = Arc::new(JsonFileBackend::new(path.clone()));
        let store = Store::open(backend.clone());
        store
            .grant_message_reward(1, 7, 100, "metal gear?!", &POLICY)
            .await
            .unwrap();
        store
            .apply(
                2,
                8,
                &Delta {
                    xp: 4000,
                    gmp: -100,
                    activity: None,
                },
            )
            .await;
        store.persist().await.unwrap();
        assert!(!store.is_dirty());

        let reloaded = Store::open(backend);
        assert_eq!(reloaded.snapshot().await, store.snapshot().await);
        assert_eq!(reloaded.get(2, 8).await.rank, "FOXHOUND");
        let _ = fs::remove_file(&path);
    }

    #[tokio::test]
    async fn malformed_file_starts_empty() {
        let path = temp_path("malformed.json");
        fs::write(&path, "{ not json").unwrap();
        let store = Store::open(Arc::new(JsonFileBackend::new(path.clone())));
        assert!(store.snapshot().await.guilds.is_empty());
        let _ = fs::remove_file(&path);
    }

    #[tokio::test]
    async fn stale_rank_fields_repair_on_load() {
        let backend = MemoryBackend::empty();
        let mut data = PersistedData::default();
        let mut record = MemberRecord {
            xp: 1000,
            ..MemberRecord::default()
        };
        record.rank = "Rookie".to_string();
        data.guilds.entry(1).or_default().insert(7, record);
        *backend.data.lock().unwrap() = Some(data);

        let store = Store::open(backend);
        assert_eq!(store.get(1, 7).await.rank, "Captain");
        assert!(store.is_dirty());
    }
}
