//! Built-in plugins for herald-bot
//!
//! Manifests in the module directories refer to these by name, e.g.
//! `execute: ping` or `handler: log-ready`.

pub mod commands;
pub mod events;

use std::sync::Arc;

use crate::infrastructure::config::Config;
use crate::infrastructure::database::DatabaseService;
use crate::infrastructure::plugins::ModuleCatalog;

pub use commands::{Echo, Help, Ping};
pub use events::{LogMessage, LogReady};

/// Catalog of every built-in executor, handler and service
pub fn builtin_catalog(config: &Config) -> ModuleCatalog {
    ModuleCatalog::new()
        .with_executor("ping", Arc::new(Ping))
        .with_executor("help", Arc::new(Help))
        .with_executor("echo", Arc::new(Echo))
        .with_handler("log-ready", Arc::new(LogReady))
        .with_handler("log-message", Arc::new(LogMessage))
        .with_service(
            "database",
            Arc::new(DatabaseService::new(
                config.database.connection_string.clone(),
                config.bot.name.clone(),
            )),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_symbols() {
        let catalog = builtin_catalog(&Config::default());
        assert_eq!(
            catalog.symbols(),
            vec!["database", "echo", "help", "log-message", "log-ready", "ping"]
        );
        assert!(catalog.executor("ping").is_some());
        assert!(catalog.handler("ping").is_none());
    }
}
