use super::{CommandResult, Context};
use poise::{builtins, command};

/// Re-register the bot's application commands (owner only)
#[command(slash_command, owners_only, ephemeral, hide_in_help)]
pub async fn register(ctx: Context<'_>) -> CommandResult {
    builtins::register_application_commands_buttons(ctx).await?;
    Ok(())
}
