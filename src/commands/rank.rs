use super::{guild_id, CommandResult, Context};
use crate::commands::CommandError;
use crate::constants::INFO_COLOR;
use crate::format::{format_number, progress_bar};
use crate::ranks;
use crate::store::MemberRecord;
use poise::{
    command,
    serenity_prelude::{CreateEmbed, User},
    CreateReply,
};

fn profile_embed(user: &User, record: &MemberRecord) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("{} {}", record.rank_icon, user.display_name()))
        .description(format!(
            "**Rank:** {}\n**GMP:** {}\n**XP:** {}",
            record.rank,
            format_number(record.gmp),
            format_number(record.xp)
        ))
        .color(INFO_COLOR)
        .thumbnail(user.face())
        .field(
            "ACTIVITY STATS",
            format!(
                "```\nMessages: {}\nVoice: {} min\nTactical Words: {}\n```",
                format_number(record.messages_sent),
                format_number(record.voice_minutes),
                format_number(record.total_tactical_words)
            ),
            false,
        )
}

fn progress_field(record: &MemberRecord) -> (&'static str, String) {
    let progress = ranks::resolve(record.xp);
    match (progress.next, progress.ceiling) {
        (Some(next), Some(ceiling)) => {
            let bar = progress_bar(record.xp - progress.floor, ceiling - progress.floor, 10);
            let needed = ceiling.saturating_sub(record.xp);
            let mut text = format!(
                "```\nNext Rank: {} {}\nXP: {} / {} {}\n\n",
                next.name,
                next.icon,
                format_number(record.xp),
                format_number(ceiling),
                bar
            );
            if needed > 0 {
                text.push_str(&format!(
                    "NEEDED FOR PROMOTION:\nXP: {}\n",
                    format_number(needed)
                ));
            } else {
                text.push_str("READY FOR PROMOTION!\n");
            }
            text.push_str("```");
            ("RANK PROGRESS", text)
        }
        _ => (
            "MAXIMUM RANK",
            format!(
                "```\n{} operative - highest rank achieved!\n```",
                progress.current.name
            ),
        ),
    }
}

/// Check your GMP balance, rank, and progress toward the next rank
#[command(slash_command, guild_only)]
pub async fn status(ctx: Context<'_>) -> CommandResult {
    let guild = guild_id(ctx)?;
    let record = ctx
        .data()
        .store
        .get(guild, ctx.author().id.get())
        .await;
    let (name, value) = progress_field(&record);
    let embed = profile_embed(ctx.author(), &record).field(name, value, false);
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Check the rank status of yourself or another member
#[command(slash_command, guild_only)]
pub async fn rank(
    ctx: Context<'_>,
    #[description = "The member to inspect (defaults to you)"] member: Option<User>,
) -> CommandResult {
    let guild = guild_id(ctx)?;
    let user = member.as_ref().unwrap_or_else(|| ctx.author());
    if user.bot {
        return Err(CommandError::Expected(String::from(
            "Bots don't have ranks.",
        )));
    }
    let record = ctx.data().store.get(guild, user.id.get()).await;
    ctx.send(CreateReply::default().embed(profile_embed(user, &record)))
        .await?;
    Ok(())
}
