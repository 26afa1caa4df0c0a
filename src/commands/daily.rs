use super::{guild_id, CommandResult, Context};
use crate::format::format_number;
use crate::message_utils::failure_embed;
use crate::store::DailyOutcome;
use chrono::{Duration, NaiveTime, Utc};
use poise::{
    command,
    serenity_prelude::{CreateEmbed, CreateEmbedFooter},
    CreateReply,
};

use crate::constants::SUCCESS_COLOR;

/// Claim your daily supply drop
#[command(slash_command, guild_only)]
pub async fn daily(ctx: Context<'_>) -> CommandResult {
    let guild = guild_id(ctx)?;
    let now = Utc::now();
    let outcome = ctx
        .data()
        .store
        .claim_daily(guild, ctx.author().id.get(), now.date_naive())
        .await;

    match outcome {
        DailyOutcome::Granted {
            xp,
            gmp,
            streak,
            record,
            promotion,
        } => {
            let mut embed = CreateEmbed::new()
                .title("DAILY SUPPLY DROP")
                .description(format!(
                    "**+{} GMP** and **+{} XP** received!",
                    format_number(gmp),
                    format_number(xp)
                ))
                .color(SUCCESS_COLOR)
                .field(
                    "UPDATED STATS",
                    format!(
                        "```\nGMP: {}\nXP: {}\nRank: {}\nStreak: {} day(s)\n```",
                        format_number(record.gmp),
                        format_number(record.xp),
                        record.rank,
                        streak
                    ),
                    false,
                )
                .footer(CreateEmbedFooter::new(
                    "Come back tomorrow for another supply drop!",
                ));
            if let Some(promotion) = promotion {
                embed = embed.field(
                    "PROMOTION!",
                    format!("New rank: **{}** {}", promotion.to.name, promotion.to.icon),
                    false,
                );
            }
            ctx.send(CreateReply::default().embed(embed)).await?;
            // The streak must survive a crash, so flush immediately.
            if let Err(err) = ctx.data().store.persist().await {
                tracing::error!("failed to persist after daily claim: {err}");
            }
        }
        DailyOutcome::AlreadyClaimed => {
            let tomorrow = (now + Duration::days(1))
                .date_naive()
                .and_time(NaiveTime::MIN)
                .and_utc();
            let left = tomorrow - now;
            let msg = format!(
                "Already claimed today.\nNext drop in **{:02}:{:02}**",
                left.num_hours(),
                left.num_minutes() % 60
            );
            ctx.send(
                CreateReply::default()
                    .embed(failure_embed(msg).title("SUPPLY DROP UNAVAILABLE")),
            )
            .await?;
        }
    }
    Ok(())
}
