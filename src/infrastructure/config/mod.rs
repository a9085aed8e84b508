//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::application::bootstrap::BootstrapOptions;
use crate::application::errors::ConfigError;
use crate::application::registry::DuplicatePolicy;
use crate::domain::traits::SyncTarget;
use crate::infrastructure::adapters::DEFAULT_API_BASE;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub modules: ModulesConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub token: Option<String>,
    pub application_id: Option<String>,
    /// Register commands on this guild only
    pub guild_id: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ModulesConfig {
    pub commands: PathBuf,
    pub events: PathBuf,
    pub services: PathBuf,
    pub on_duplicate: DuplicatePolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DatabaseConfig {
    pub connection_string: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "herald-bot".to_string(),
            token: None,
            application_id: None,
            guild_id: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            commands: PathBuf::from("./commands"),
            events: PathBuf::from("./events"),
            services: PathBuf::from("./services"),
            on_duplicate: DuplicatePolicy::Replace,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_string: crate::infrastructure::database::PLACEHOLDER_CONNECTION.to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Load `path` if it exists, otherwise defaults; environment overrides either way
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let config = if path.exists() {
            match Self::load(path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("{}, using defaults", e);
                    Self::default()
                }
            }
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.with_env()
    }

    /// Apply `BOT_TOKEN`, `BOT_APPLICATION_ID`, `BOT_GUILD_ID` and `DATABASE_URL`
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = var("BOT_TOKEN") {
            self.bot.token = Some(token);
        }
        if let Some(id) = var("BOT_APPLICATION_ID") {
            self.bot.application_id = Some(id);
        }
        if let Some(guild) = var("BOT_GUILD_ID") {
            self.bot.guild_id = Some(guild);
        }
        if let Some(url) = var("DATABASE_URL") {
            self.database.connection_string = url;
        }
        self
    }

    /// Reject settings the runtime cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.name.trim().is_empty() {
            return Err(ConfigError::MissingField("bot.name".to_string()));
        }
        if !self.bot.api_base.starts_with("http://") && !self.bot.api_base.starts_with("https://") {
            return Err(ConfigError::InvalidValue(format!("bot.api-base: {}", self.bot.api_base)));
        }
        if self.bot.token.is_some() && self.bot.application_id.is_none() {
            return Err(ConfigError::MissingField("bot.application-id".to_string()));
        }
        Ok(())
    }

    /// Registration target; `local` stands in for a missing application id
    pub fn sync_target(&self) -> SyncTarget {
        SyncTarget {
            application_id: self.bot.application_id.clone().unwrap_or_else(|| "local".to_string()),
            guild_id: self.bot.guild_id.clone(),
        }
    }

    /// True when remote registration can actually be performed
    pub fn has_credentials(&self) -> bool {
        self.bot.token.as_deref().is_some_and(|t| !t.is_empty()) && self.bot.application_id.is_some()
    }

    pub fn bootstrap_options(&self) -> BootstrapOptions {
        BootstrapOptions {
            commands_dir: self.modules.commands.clone(),
            events_dir: self.modules.events.clone(),
            services_dir: self.modules.services.clone(),
            on_duplicate: self.modules.on_duplicate,
            target: self.sync_target(),
        }
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
