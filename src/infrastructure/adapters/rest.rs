//! REST command registration

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::application::errors::RegistrationError;
use crate::domain::traits::{CommandRegistrar, SyncTarget};

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Registers commands with a bulk-overwrite `PUT`
pub struct RestRegistrar {
    api_base: String,
    token: String,
    client: Client,
}

impl RestRegistrar {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.into(),
            client: Client::new(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Guild-scoped endpoint when the target has a guild, global otherwise
    pub fn endpoint(&self, target: &SyncTarget) -> String {
        match &target.guild_id {
            Some(guild) => format!(
                "{}/applications/{}/guilds/{}/commands",
                self.api_base, target.application_id, guild
            ),
            None => format!("{}/applications/{}/commands", self.api_base, target.application_id),
        }
    }
}

#[async_trait]
impl CommandRegistrar for RestRegistrar {
    async fn put_commands(&self, target: &SyncTarget, commands: &[Value]) -> Result<(), RegistrationError> {
        let url = self.endpoint(target);
        tracing::debug!(%url, count = commands.len(), "Putting application commands");

        let response = self
            .client
            .put(&url)
            .header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.token))
            .json(commands)
            .send()
            .await
            .map_err(|e| RegistrationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistrationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Registrar used when no credentials are configured; only logs
#[derive(Debug, Default)]
pub struct LogRegistrar;

#[async_trait]
impl CommandRegistrar for LogRegistrar {
    async fn put_commands(&self, target: &SyncTarget, commands: &[Value]) -> Result<(), RegistrationError> {
        let names: Vec<&str> = commands
            .iter()
            .filter_map(|c| c.get("name").and_then(Value::as_str))
            .collect();
        tracing::info!(
            application = %target.application_id,
            guild = target.guild_id.as_deref().unwrap_or("global"),
            "Would register commands: {}",
            names.join(", ")
        );
        Ok(())
    }
}
