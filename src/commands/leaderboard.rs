use super::{guild_id, CommandResult, Context};
use crate::constants::{INFO_COLOR, LEADERBOARD_LIMIT};
use crate::format::format_number;
use crate::store::LeaderboardKey;
use poise::{
    command,
    serenity_prelude::{CreateEmbed, GuildId, UserId},
    ChoiceParameter, CreateReply,
};

#[derive(Debug, Clone, Copy, ChoiceParameter)]
pub enum Category {
    #[name = "Experience Points"]
    Xp,
    #[name = "GMP Ranking"]
    Gmp,
    #[name = "Tactical Words"]
    Tactical,
    #[name = "Messages Sent"]
    Messages,
}

impl Category {
    const fn key(self) -> LeaderboardKey {
        match self {
            Self::Xp => LeaderboardKey::Xp,
            Self::Gmp => LeaderboardKey::Gmp,
            Self::Tactical => LeaderboardKey::TacticalWords,
            Self::Messages => LeaderboardKey::Messages,
        }
    }

    const fn unit(self) -> &'static str {
        match self {
            Self::Xp => "XP",
            Self::Gmp => "GMP",
            Self::Tactical => "tactical words",
            Self::Messages => "messages",
        }
    }

    fn value(self, record: &crate::store::MemberRecord) -> String {
        match self {
            Self::Xp => format_number(record.xp),
            Self::Gmp => format_number(record.gmp),
            Self::Tactical => format_number(record.total_tactical_words),
            Self::Messages => format_number(record.messages_sent),
        }
    }
}

const fn medal(position: usize) -> Option<&'static str> {
    match position {
        1 => Some("🥇"),
        2 => Some("🥈"),
        3 => Some("🥉"),
        _ => None,
    }
}

/// View the server leaderboard
#[command(slash_command, guild_only)]
pub async fn leaderboard(
    ctx: Context<'_>,
    #[description = "Ranking category (defaults to XP)"] category: Option<Category>,
) -> CommandResult {
    let guild = guild_id(ctx)?;
    let category = category.unwrap_or(Category::Xp);
    let entries = ctx
        .data()
        .store
        .leaderboard(guild, category.key(), LEADERBOARD_LIMIT)
        .await;

    let mut embed = CreateEmbed::new()
        .title(format!("LEADERBOARD: {}", category.name().to_uppercase()))
        .color(INFO_COLOR);
    if entries.is_empty() {
        embed = embed.field("NO DATA", "No operatives found.", false);
        ctx.send(CreateReply::default().embed(embed)).await?;
        return Ok(());
    }

    let mut lines = String::new();
    for (position, (member, record)) in entries.iter().enumerate() {
        let name = display_name(ctx, GuildId::new(guild), *member).await;
        let prefix = medal(position + 1).map_or_else(
            || format!("{}.", position + 1),
            ToString::to_string,
        );
        lines.push_str(&format!(
            "{prefix} **{name}** - {} {} {}\n",
            category.value(record),
            category.unit(),
            record.rank_icon
        ));
    }
    embed = embed.field("TOP OPERATIVES", lines, false);
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

async fn display_name(ctx: Context<'_>, guild: GuildId, member: u64) -> String {
    match guild.member(ctx, UserId::new(member)).await {
        Ok(member) => member.display_name().to_string(),
        Err(_) => format!("Unknown ({member})"),
    }
}
