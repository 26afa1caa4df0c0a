#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::unreadable_literal,
    clippy::cast_possible_wrap
)]

mod commands;
mod config;
mod constants;
mod error_handler;
mod events;
mod format;
mod message_utils;
mod news;
mod ranks;
mod rewards;
mod store;
mod sync;

use anyhow::Result;
use commands::{daily, help, intel, leaderboard, rank, register, Data};
use config::Config;
use events::{ReactionListener, Registry, RewardListener, VoiceListener, WelcomeListener};
use news::NewsClient;
use poise::{
    builtins,
    serenity_prelude::{ClientBuilder, Command, CreateAllowedMentions, GatewayIntents},
    Framework, FrameworkOptions,
};
use rewards::RewardPolicy;
use std::sync::Arc;
use store::{JsonFileBackend, Store};
use tokio::task;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();
    let config = Config::from_env()?;

    let backend = Arc::new(JsonFileBackend::new(config.database_file.clone()));
    let store = Arc::new(Store::open(backend));
    let policy = RewardPolicy::new(config.cooldown_secs, config.tactical_bonus_cap);

    let news = match config.news_api_key.clone().filter(|_| config.enable_intel) {
        Some(key) => Some(NewsClient::new(key)?),
        None => {
            info!("intel command disabled: no NEWS_API_KEY configured");
            None
        }
    };

    let registry = Registry::new(vec![
        Box::new(RewardListener::new(Arc::clone(&store), policy)),
        Box::new(WelcomeListener::new(
            Arc::clone(&store),
            config.welcome_channel,
        )),
        Box::new(ReactionListener::new(Arc::clone(&store))),
        Box::new(VoiceListener::new(Arc::clone(&store))),
    ]);

    task::spawn({
        let store = Arc::clone(&store);
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                if store.is_dirty() {
                    if let Err(err) = store.persist().await {
                        error!("final save failed: {err}");
                    }
                }
                std::process::exit(0);
            }
        }
    });

    let options = FrameworkOptions {
        commands: vec![
            rank::status(),
            rank::rank(),
            leaderboard::leaderboard(),
            daily::daily(),
            intel::intel(),
            help::help(),
            register::register(),
        ],
        on_error: |err| {
            Box::pin(async move {
                if let Err(err) = error_handler::handle(err).await {
                    error!("Error while handling error: {}", err);
                }
            })
        },
        event_handler: |ctx, event, _framework, data: &Data| {
            Box::pin(async move {
                data.registry.dispatch(ctx, event).await;
                Ok(())
            })
        },
        allowed_mentions: Some(
            CreateAllowedMentions::new()
                .all_roles(false)
                .all_users(false)
                .replied_user(true),
        ),
        ..Default::default()
    };

    let token = config.token.clone();
    let framework = Framework::builder()
        .setup(move |ctx, _, framework| {
            Box::pin(async move {
                task::spawn(Arc::clone(&store).flush_loop(config.flush_interval));
                match config
                    .mirror_database_url
                    .clone()
                    .filter(|_| config.enable_remote_sync)
                {
                    Some(url) => {
                        task::spawn(sync::run(Arc::clone(&store), url, config.sync_interval));
                    }
                    None => warn!("remote sync disabled: no MIRROR_DATABASE_URL configured"),
                }
                Command::set_global_commands(
                    ctx,
                    builtins::create_application_commands(&framework.options().commands),
                )
                .await?;
                Ok(Data {
                    store,
                    news,
                    registry,
                })
            })
        })
        .options(options)
        .build();

    let mut client = ClientBuilder::new(
        token,
        GatewayIntents::non_privileged()
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_MEMBERS,
    )
    .framework(framework)
    .await?;
    Ok(client.start().await?)
}
