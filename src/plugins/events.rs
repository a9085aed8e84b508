//! Built-in event handlers

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::client::Client;
use crate::application::errors::HandlerResult;
use crate::domain::entities::GatewayEvent;
use crate::domain::traits::EventHandler;

/// Logs the session user once the client is ready
pub struct LogReady;

#[async_trait]
impl EventHandler for LogReady {
    async fn handle(&self, client: Arc<Client>, event: GatewayEvent) -> HandlerResult {
        if let GatewayEvent::Ready(info) = event {
            tracing::info!(
                commands = client.commands().len(),
                guilds = info.guild_count,
                "Ready! Logged in as {}",
                info.user
            );
        }
        Ok(())
    }
}

pub struct LogMessage;

#[async_trait]
impl EventHandler for LogMessage {
    async fn handle(&self, _client: Arc<Client>, event: GatewayEvent) -> HandlerResult {
        if let GatewayEvent::MessageCreate(message) = event {
            tracing::debug!(
                channel = %message.channel_id,
                author = %message.author,
                "{}",
                message.content
            );
        }
        Ok(())
    }
}
