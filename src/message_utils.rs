use crate::constants;
use poise::{serenity_prelude::CreateEmbed, CreateReply};

pub fn failure_embed(content: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .description(content)
        .color(constants::FAILURE_COLOR)
}

pub fn failure_message(content: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(failure_embed(content))
}
