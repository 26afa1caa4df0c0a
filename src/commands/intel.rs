use super::{CommandResult, Context};
use crate::commands::CommandError;
use crate::constants::{FAILURE_COLOR, INTEL_HEADLINE_COUNT};
use poise::{command, serenity_prelude::CreateEmbed, CreateReply};
use tracing::error;

/// Get the latest news as intelligence reports
#[command(slash_command, user_cooldown = 30)]
pub async fn intel(ctx: Context<'_>) -> CommandResult {
    let Some(news) = ctx.data().news.as_ref() else {
        return Err(CommandError::Expected(String::from(
            "Intel system offline - API key not configured",
        )));
    };
    ctx.defer().await?;
    let articles = match news
        .country_news("us", "United States", INTEL_HEADLINE_COUNT)
        .await
    {
        Ok(articles) => articles,
        Err(err) => {
            error!("intel retrieval failed: {err}");
            return Err(CommandError::Expected(String::from(
                "Intel retrieval failed - try again later",
            )));
        }
    };
    if articles.is_empty() {
        return Err(CommandError::Expected(String::from(
            "No intel available at this time.",
        )));
    }
    let mut embed = CreateEmbed::new().title("📡 INTEL REPORT").color(FAILURE_COLOR);
    for (i, article) in articles.iter().take(INTEL_HEADLINE_COUNT).enumerate() {
        embed = embed.field(
            format!("Intel #{}", i + 1),
            format!("```{}```\n[Read more]({})", article.title, article.url),
            false,
        );
    }
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}
