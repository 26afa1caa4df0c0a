//! Gateway event handling through an explicit listener registry.
//!
//! Each listener declares the event kinds it wants; the registry dispatches
//! in registration order and logs failures, so one broken listener can
//! neither crash the process nor starve the ones behind it.

use crate::constants::{
    RankDef, INFO_COLOR, RANKS, REACTION_RECEIVED_REWARD, REACTION_REWARD, STARTING_GMP,
    VOICE_MINUTE_REWARD,
};
use crate::format::format_number;
use crate::rewards::RewardPolicy;
use crate::store::{now_epoch, Activity, Delta, Promotion, Store};
use ahash::HashMap;
use anyhow::Result;
use poise::serenity_prelude::{
    self as serenity, async_trait, ChannelId, CreateEmbed, CreateMessage, FullEvent, GuildId,
    Mentionable, ReactionType, RoleId, UserId,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Ready,
    Message,
    MemberJoin,
    ReactionAdd,
    ReactionRemove,
    VoiceStateUpdate,
}

impl EventKind {
    fn of(event: &FullEvent) -> Option<Self> {
        match event {
            FullEvent::Ready { .. } => Some(Self::Ready),
            FullEvent::Message { .. } => Some(Self::Message),
            FullEvent::GuildMemberAddition { .. } => Some(Self::MemberJoin),
            FullEvent::ReactionAdd { .. } => Some(Self::ReactionAdd),
            FullEvent::ReactionRemove { .. } => Some(Self::ReactionRemove),
            FullEvent::VoiceStateUpdate { .. } => Some(Self::VoiceStateUpdate),
            _ => None,
        }
    }
}

#[async_trait]
pub trait Listener: Send + Sync {
    fn name(&self) -> &'static str;
    fn kinds(&self) -> &'static [EventKind];
    async fn handle(&self, ctx: &serenity::Context, event: &FullEvent) -> Result<()>;
}

/// Ordered set of listeners per event kind, built once at startup.
pub struct Registry {
    listeners: Vec<Box<dyn Listener>>,
}

impl Registry {
    pub fn new(listeners: Vec<Box<dyn Listener>>) -> Self {
        Self { listeners }
    }

    pub async fn dispatch(&self, ctx: &serenity::Context, event: &FullEvent) {
        let Some(kind) = EventKind::of(event) else {
            return;
        };
        for listener in self
            .listeners
            .iter()
            .filter(|listener| listener.kinds().contains(&kind))
        {
            if let Err(err) = listener.handle(ctx, event).await {
                error!(
                    "{} listener failed on {} event: {err:?}",
                    listener.name(),
                    event.snake_case_name()
                );
            }
        }
    }
}

/// Swaps a member's rank roles to match a newly reached rank. Returns whether
/// the new role was actually granted.
async fn update_rank_roles(
    ctx: &serenity::Context,
    guild: GuildId,
    user: UserId,
    new_rank: &RankDef,
) -> Result<bool> {
    let member = guild.member(ctx, user).await?;
    let roles = guild.roles(ctx).await?;
    let rank_role_names: Vec<&str> = RANKS.iter().filter_map(|rank| rank.role_name).collect();
    let stale: Vec<RoleId> = member
        .roles
        .iter()
        .filter(|id| {
            roles
                .get(id)
                .is_some_and(|role| rank_role_names.contains(&role.name.as_str()))
        })
        .copied()
        .collect();
    if !stale.is_empty() {
        member.remove_roles(ctx, &stale).await?;
    }
    let Some(role_name) = new_rank.role_name else {
        return Ok(true);
    };
    match roles.iter().find(|(_, role)| role.name == role_name) {
        Some((id, _)) => {
            member.add_role(ctx, *id).await?;
            Ok(true)
        }
        None => {
            warn!("role '{role_name}' not found in guild {guild}");
            Ok(false)
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn announce_promotion(
    ctx: &serenity::Context,
    channel: ChannelId,
    guild: GuildId,
    user: UserId,
    display_name: &str,
    promotion: &Promotion,
    current_xp: u64,
    current_gmp: i64,
) -> Result<()> {
    let role_granted = update_rank_roles(ctx, guild, user, promotion.to).await?;
    let mut embed = CreateEmbed::new()
        .title("🎖️ RANK PROMOTION")
        .description(format!(
            "**{display_name}** promoted from **{}** to **{}**!",
            promotion.from.name, promotion.to.name
        ))
        .color(INFO_COLOR)
        .field(
            "CURRENT STATUS",
            format!(
                "```\nXP: {}\nGMP: {}\n```",
                format_number(current_xp),
                format_number(current_gmp)
            ),
            false,
        );
    if role_granted {
        if let Some(role_name) = promotion.to.role_name {
            embed = embed.field(
                "🎖️ ROLE ASSIGNED",
                format!("Discord role **{role_name}** granted!"),
                false,
            );
        }
    } else {
        embed = embed.field(
            "⚠️ ROLE UPDATE",
            "Role assignment failed - contact an admin",
            false,
        );
    }
    channel
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await?;
    info!(
        "promotion: {user} promoted from {} to {}",
        promotion.from.name, promotion.to.name
    );
    Ok(())
}

/// Grants message XP/GMP through the reward policy and announces promotions.
pub struct RewardListener {
    store: Arc<Store>,
    policy: RewardPolicy,
}

impl RewardListener {
    pub fn new(store: Arc<Store>, policy: RewardPolicy) -> Self {
        Self { store, policy }
    }
}

#[async_trait]
impl Listener for RewardListener {
    fn name(&self) -> &'static str {
        "reward"
    }

    fn kinds(&self) -> &'static [EventKind] {
        &[EventKind::Message]
    }

    async fn handle(&self, ctx: &serenity::Context, event: &FullEvent) -> Result<()> {
        let FullEvent::Message { new_message: msg } = event else {
            return Ok(());
        };
        if msg.author.bot {
            return Ok(());
        }
        let Some(guild) = msg.guild_id else {
            return Ok(());
        };
        let Some(outcome) = self
            .store
            .grant_message_reward(
                guild.get(),
                msg.author.id.get(),
                now_epoch(),
                &msg.content,
                &self.policy,
            )
            .await
        else {
            return Ok(());
        };
        debug!(
            "member {}: +{} XP (+{} GMP, {} tactical words)",
            msg.author.id, outcome.grant.xp, outcome.grant.gmp, outcome.grant.tactical_words
        );
        if let Some(promotion) = outcome.promotion {
            msg.react(ctx, ReactionType::Unicode(String::from("🎖️")))
                .await?;
            announce_promotion(
                ctx,
                msg.channel_id,
                guild,
                msg.author.id,
                msg.author.display_name(),
                &promotion,
                outcome.record.xp,
                outcome.record.gmp,
            )
            .await?;
        }
        Ok(())
    }
}

/// Provisions and welcomes newly joined members.
pub struct WelcomeListener {
    store: Arc<Store>,
    welcome_channel: Option<ChannelId>,
}

impl WelcomeListener {
    pub fn new(store: Arc<Store>, welcome_channel: Option<ChannelId>) -> Self {
        Self {
            store,
            welcome_channel,
        }
    }
}

#[async_trait]
impl Listener for WelcomeListener {
    fn name(&self) -> &'static str {
        "welcome"
    }

    fn kinds(&self) -> &'static [EventKind] {
        &[EventKind::Ready, EventKind::MemberJoin]
    }

    async fn handle(&self, ctx: &serenity::Context, event: &FullEvent) -> Result<()> {
        match event {
            FullEvent::Ready { data_about_bot } => {
                info!(
                    "{} is online, connected to {} guild(s)",
                    data_about_bot.user.name,
                    data_about_bot.guilds.len()
                );
            }
            FullEvent::GuildMemberAddition { new_member } => {
                let guild = new_member.guild_id.get();
                let user = new_member.user.id.get();
                info!("new member joined: {user} in guild {guild}");
                self.store.get(guild, user).await;
                self.store.mark_verified(guild, user).await;
                let Some(channel) = self.welcome_channel else {
                    return Ok(());
                };
                let embed = CreateEmbed::new()
                    .title("🔰 NEW OPERATIVE DETECTED")
                    .description(format!(
                        "**{}** has joined Mother Base!",
                        new_member.display_name()
                    ))
                    .color(INFO_COLOR)
                    .thumbnail(new_member.face())
                    .field("STARTING RESOURCES", starting_resources(), true)
                    .field(
                        "QUICK START",
                        "```\n/status - Check status\n/daily - Get bonus\n/help - Commands\n```",
                        true,
                    );
                channel
                    .send_message(
                        ctx,
                        CreateMessage::new()
                            .content(format!(
                                "🟢 **Welcome to Mother Base, {}!**",
                                new_member.mention()
                            ))
                            .embed(embed),
                    )
                    .await?;
            }
            _ => {}
        }
        Ok(())
    }
}

fn starting_resources() -> String {
    format!(
        "```\n🔰 Rank: {}\n💰 GMP: {}\n⚡ XP: 0\n```",
        RANKS[0].name,
        format_number(STARTING_GMP)
    )
}

/// A reaction payload without a member object gives no way to tell bots
/// apart, so the grant is skipped.
fn eligible_reactor(user: Option<UserId>, reactor_is_bot: Option<bool>) -> Option<UserId> {
    match (user, reactor_is_bot) {
        (Some(user), Some(false)) => Some(user),
        _ => None,
    }
}

/// Grants XP for reactions given and received.
pub struct ReactionListener {
    store: Arc<Store>,
}

impl ReactionListener {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Listener for ReactionListener {
    fn name(&self) -> &'static str {
        "reaction"
    }

    fn kinds(&self) -> &'static [EventKind] {
        &[EventKind::ReactionAdd, EventKind::ReactionRemove]
    }

    async fn handle(&self, ctx: &serenity::Context, event: &FullEvent) -> Result<()> {
        match event {
            FullEvent::ReactionAdd { add_reaction } => {
                let Some(guild) = add_reaction.guild_id else {
                    return Ok(());
                };
                let Some(user) = eligible_reactor(
                    add_reaction.user_id,
                    add_reaction.member.as_ref().map(|member| member.user.bot),
                ) else {
                    return Ok(());
                };
                let promotion = self
                    .store
                    .apply(
                        guild.get(),
                        user.get(),
                        &Delta {
                            xp: REACTION_REWARD.xp,
                            gmp: REACTION_REWARD.gmp,
                            activity: Some(Activity::Reaction),
                        },
                    )
                    .await;
                if let Some(promotion) = promotion {
                    self.announce(ctx, add_reaction.channel_id, guild, user, &promotion)
                        .await?;
                }
                // The message author earns a little for sparking the reaction.
                if let Some(author) = add_reaction.message_author_id {
                    if author != user {
                        let promotion = self
                            .store
                            .apply(
                                guild.get(),
                                author.get(),
                                &Delta {
                                    xp: REACTION_RECEIVED_REWARD.xp,
                                    gmp: REACTION_RECEIVED_REWARD.gmp,
                                    activity: Some(Activity::ReactionReceived),
                                },
                            )
                            .await;
                        if let Some(promotion) = promotion {
                            self.announce(ctx, add_reaction.channel_id, guild, author, &promotion)
                                .await?;
                        }
                    }
                }
            }
            FullEvent::ReactionRemove { removed_reaction } => {
                // Read-only trigger: rewards are never clawed back.
                debug!(
                    "reaction removed in channel {}",
                    removed_reaction.channel_id
                );
            }
            _ => {}
        }
        Ok(())
    }
}

/// Whole minutes spent in a voice session; partial minutes earn nothing.
fn voice_session_minutes(joined: u64, left: u64) -> u64 {
    left.saturating_sub(joined) / 60
}

/// Tracks voice channel sessions and awards XP/GMP per whole minute when a
/// member disconnects.
pub struct VoiceListener {
    store: Arc<Store>,
    sessions: Mutex<HashMap<(u64, u64), u64>>,
}

impl VoiceListener {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            sessions: Mutex::new(HashMap::default()),
        }
    }
}

#[async_trait]
impl Listener for VoiceListener {
    fn name(&self) -> &'static str {
        "voice"
    }

    fn kinds(&self) -> &'static [EventKind] {
        &[EventKind::VoiceStateUpdate]
    }

    async fn handle(&self, _ctx: &serenity::Context, event: &FullEvent) -> Result<()> {
        let FullEvent::VoiceStateUpdate { new, .. } = event else {
            return Ok(());
        };
        if new.member.as_ref().is_some_and(|member| member.user.bot) {
            return Ok(());
        }
        let Some(guild) = new.guild_id else {
            return Ok(());
        };
        let key = (guild.get(), new.user_id.get());
        let finished = {
            let mut sessions = self.sessions.lock().await;
            if new.channel_id.is_some() {
                // Switching channels keeps the original join time.
                sessions.entry(key).or_insert_with(now_epoch);
                None
            } else {
                sessions.remove(&key)
            }
        };
        let Some(joined) = finished else {
            return Ok(());
        };
        let minutes = voice_session_minutes(joined, now_epoch());
        if minutes == 0 {
            return Ok(());
        }
        let promotion = self
            .store
            .apply(
                key.0,
                key.1,
                &Delta {
                    xp: minutes * VOICE_MINUTE_REWARD.xp,
                    gmp: (minutes as i64).saturating_mul(VOICE_MINUTE_REWARD.gmp),
                    activity: Some(Activity::Voice { minutes }),
                },
            )
            .await;
        info!(
            "voice activity: member {} spent {minutes} min in guild {}",
            key.1, key.0
        );
        if let Some(promotion) = promotion {
            info!(
                "promotion: {} promoted from {} to {} after voice activity",
                key.1, promotion.from.name, promotion.to.name
            );
        }
        Ok(())
    }
}

impl ReactionListener {
    async fn announce(
        &self,
        ctx: &serenity::Context,
        channel: ChannelId,
        guild: GuildId,
        user: UserId,
        promotion: &Promotion,
    ) -> Result<()> {
        let record = self.store.get(guild.get(), user.get()).await;
        let display_name = guild
            .member(ctx, user)
            .await
            .map_or_else(|_| user.to_string(), |member| member.display_name().to_string());
        announce_promotion(
            ctx,
            channel,
            guild,
            user,
            &display_name,
            promotion,
            record.xp,
            record.gmp,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_role_names_are_distinct() {
        // Role swapping identifies rank roles by name, so duplicates would
        // strip the wrong role.
        let names: Vec<_> = RANKS.iter().filter_map(|rank| rank.role_name).collect();
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
    }

    #[test]
    fn reactors_without_member_payload_are_ineligible() {
        let user = UserId::new(7);
        assert_eq!(eligible_reactor(Some(user), Some(false)), Some(user));
        assert_eq!(eligible_reactor(Some(user), Some(true)), None);
        assert_eq!(eligible_reactor(Some(user), None), None);
        assert_eq!(eligible_reactor(None, Some(false)), None);
    }

    #[test]
    fn voice_sessions_floor_to_whole_minutes() {
        assert_eq!(voice_session_minutes(0, 59), 0);
        assert_eq!(voice_session_minutes(0, 60), 1);
        assert_eq!(voice_session_minutes(100, 250), 2);
        assert_eq!(voice_session_minutes(100, 40), 0);
    }

    #[test]
    fn welcome_resources_follow_the_constants() {
        let block = starting_resources();
        assert!(block.contains(&format_number(STARTING_GMP)));
        assert!(block.contains(RANKS[0].name));
    }
}
