use crate::events::Registry;
use crate::news::NewsClient;
use crate::store::Store;
use poise::serenity_prelude;
use std::sync::Arc;
use thiserror::Error;

pub mod daily;
pub mod help;
pub mod intel;
pub mod leaderboard;
pub mod rank;
pub mod register;

/// Shared bot state, built once at startup and handed to poise.
pub struct Data {
    pub store: Arc<Store>,
    pub news: Option<NewsClient>,
    pub registry: Registry,
}

pub type Context<'a> = poise::Context<'a, Data, CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    /// Shown to the invoking user as-is.
    #[error("{0}")]
    Expected(String),
    #[error(transparent)]
    Unexpected(anyhow::Error),
}

impl From<serenity_prelude::Error> for CommandError {
    fn from(value: serenity_prelude::Error) -> Self {
        Self::Unexpected(value.into())
    }
}

pub type CommandResult = Result<(), CommandError>;

/// Guild id for a guild-only command.
fn guild_id(ctx: Context<'_>) -> Result<u64, CommandError> {
    ctx.guild_id()
        .map(|id| id.get())
        .ok_or_else(|| CommandError::Expected(String::from("This command only works in a guild.")))
}
