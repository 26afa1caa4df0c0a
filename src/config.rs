//! Environment-driven configuration, read once at startup and passed to
//! every component explicitly.

use crate::constants::{
    DEFAULT_COOLDOWN_SECS, DEFAULT_FLUSH_INTERVAL_MINUTES, DEFAULT_SYNC_INTERVAL_MINUTES,
    DEFAULT_TACTICAL_BONUS_CAP,
};
use anyhow::{Context, Result};
use poise::serenity_prelude::ChannelId;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub news_api_key: Option<String>,
    pub welcome_channel: Option<ChannelId>,
    pub database_file: PathBuf,
    pub mirror_database_url: Option<String>,
    /// Seconds between two reward-eligible messages from the same member.
    pub cooldown_secs: u64,
    /// Most keywords counted toward the bonus in one message.
    pub tactical_bonus_cap: u32,
    pub flush_interval: Duration,
    pub sync_interval: Duration,
    pub enable_intel: bool,
    pub enable_remote_sync: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TOKEN").context("failed to get bot token")?;
        let news_api_key = env::var("NEWS_API_KEY").ok().filter(|key| !key.is_empty());
        let welcome_channel = parse_env("WELCOME_CHANNEL_ID")?.map(ChannelId::new);
        let database_file = env::var("DATABASE_FILE")
            .map_or_else(|_| PathBuf::from("member_data.json"), PathBuf::from);
        let mirror_database_url = env::var("MIRROR_DATABASE_URL")
            .ok()
            .filter(|url| !url.is_empty());
        let cooldown_secs = parse_env("MESSAGE_COOLDOWN")?.unwrap_or(DEFAULT_COOLDOWN_SECS);
        let tactical_bonus_cap =
            parse_env("TACTICAL_BONUS_MAX")?.unwrap_or(DEFAULT_TACTICAL_BONUS_CAP);
        let flush_interval = Duration::from_secs(
            60 * parse_env("AUTO_SAVE_INTERVAL_MINUTES")?
                .unwrap_or(DEFAULT_FLUSH_INTERVAL_MINUTES),
        );
        let sync_interval = Duration::from_secs(
            60 * parse_env("SYNC_INTERVAL_MINUTES")?.unwrap_or(DEFAULT_SYNC_INTERVAL_MINUTES),
        );
        let enable_intel = env::var("ENABLE_INTEL").map_or(true, |raw| parse_flag(&raw));
        let enable_remote_sync = env::var("ENABLE_REMOTE_SYNC").map_or(true, |raw| parse_flag(&raw));
        Ok(Self {
            token,
            news_api_key,
            welcome_channel,
            database_file,
            mirror_database_url,
            cooldown_secs,
            tactical_bonus_cap,
            flush_interval,
            sync_interval,
            enable_intel,
            enable_remote_sync,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.is_empty() => {
            let parsed = raw
                .parse()
                .with_context(|| format!("failed to parse {name}={raw}"))?;
            Ok(Some(parsed))
        }
        _ => Ok(None),
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse_common_spellings() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" yes "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("banana"));
    }
}
