use crate::{commands::CommandError, message_utils::failure_message};
use anyhow::Result;
use poise::FrameworkError;
use tracing::{error, warn};

pub async fn handle<T: Send + Sync>(error: FrameworkError<'_, T, CommandError>) -> Result<()> {
    match error {
        FrameworkError::Setup { error, .. } => {
            error!("Error in user data setup: {:?}", error);
        }
        FrameworkError::EventHandler { error, event, .. } => error!(
            "User event handler encountered an error on {} event: {}",
            event.snake_case_name(),
            error
        ),
        FrameworkError::Command { ctx, error, .. } => {
            let error_msg = match error {
                CommandError::Expected(msg) => msg,
                CommandError::Unexpected(err) => {
                    error!(
                        "An unexpected error occured in command {}: {:?}",
                        ctx.command().name,
                        &err
                    );
                    format!("This command encountered an unexpected error:\n {err}")
                }
            };
            ctx.send(failure_message(error_msg).ephemeral(true)).await?;
        }
        FrameworkError::CommandPanic { ctx, payload, .. } => {
            // Not showing the payload to the user because it may contain sensitive info
            error!(
                "Command {} panicked with payload: {:?}",
                ctx.command().name,
                payload
            );
            ctx.send(
                failure_message("An unexpected internal error has occurred.").ephemeral(true),
            )
            .await?;
        }
        FrameworkError::ArgumentParse {
            ctx, input, error, ..
        } => {
            let usage = ctx.command().help_text.as_ref().map_or(
                "Please check the help menu for usage information.",
                |help_text| &**help_text,
            );
            let response = input.map_or_else(
                || format!("**{error}**\n{usage}"),
                |input| format!("**Cannot parse `{input}` as argument: {error}**\n{usage}"),
            );
            ctx.send(failure_message(response).ephemeral(true)).await?;
        }
        FrameworkError::CommandStructureMismatch {
            ctx, description, ..
        } => {
            error!(
                "Failed to deserialize interaction arguments for `/{}`: {}",
                ctx.command.name, description,
            );
        }
        FrameworkError::CooldownHit {
            remaining_cooldown,
            ctx,
            ..
        } => {
            let msg = format!(
                "You're too fast. Please wait {} seconds before retrying.",
                remaining_cooldown.as_secs()
            );
            ctx.send(failure_message(msg).ephemeral(true)).await?;
        }
        FrameworkError::MissingBotPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            let msg = format!(
                "Command cannot be executed because the bot is lacking permissions: {missing_permissions}",
            );
            ctx.send(failure_message(msg).ephemeral(true)).await?;
        }
        FrameworkError::MissingUserPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            let response = missing_permissions.map_or_else(
                || {
                    format!(
                        "You may be lacking permissions for `/{}`. This command cannot be executed for safety.",
                        ctx.command().name,
                    )
                },
                |missing_permissions| {
                    format!(
                        "You're lacking permissions for `/{}`: {}",
                        ctx.command().name,
                        missing_permissions,
                    )
                },
            );
            ctx.send(failure_message(response).ephemeral(true)).await?;
        }
        FrameworkError::NotAnOwner { ctx, .. } => {
            ctx.send(failure_message("Only bot owners can call this command.").ephemeral(true))
                .await?;
        }
        FrameworkError::GuildOnly { ctx, .. } => {
            ctx.send(failure_message("You cannot run this command in DMs.").ephemeral(true))
                .await?;
        }
        FrameworkError::UnknownInteraction { interaction, .. } => {
            warn!("Received unknown interaction \"{}\"", interaction.data.name);
        }
        _ => {}
    }
    Ok(())
}
