//! Built-in commands

use async_trait::async_trait;

use crate::application::errors::HandlerResult;
use crate::application::interaction::CommandContext;
use crate::domain::entities::{Embed, ResponsePayload};
use crate::domain::traits::CommandExecutor;

/// `/ping` - liveness check
pub struct Ping;

#[async_trait]
impl CommandExecutor for Ping {
    async fn execute(&self, ctx: CommandContext) -> HandlerResult {
        ctx.reply(ResponsePayload::text("Pong!")).await?;
        Ok(())
    }
}

/// `/help` - lists every registered command
pub struct Help;

#[async_trait]
impl CommandExecutor for Help {
    async fn execute(&self, ctx: CommandContext) -> HandlerResult {
        let lines: Vec<String> = ctx
            .client()
            .commands()
            .iter()
            .map(|command| match command.metadata.description() {
                Some(description) => format!("/{} - {}", command.name, description),
                None => format!("/{}", command.name),
            })
            .collect();

        let description = if lines.is_empty() {
            "No commands are registered.".to_string()
        } else {
            lines.join("\n")
        };

        let embed = Embed::new().with_title("Commands").with_description(description);
        ctx.reply(ResponsePayload::embed(embed).ephemeral()).await?;
        Ok(())
    }
}

/// `/echo text:<text>` - repeats the text after a deferral
pub struct Echo;

#[async_trait]
impl CommandExecutor for Echo {
    async fn execute(&self, ctx: CommandContext) -> HandlerResult {
        ctx.defer_reply(false).await?;
        let text = ctx
            .interaction()
            .option_str("text")
            .ok_or("missing required option \"text\"")?
            .to_string();
        ctx.follow_up(ResponsePayload::text(text)).await?;
        Ok(())
    }
}
