//! Domain traits - Plugin capabilities and the platform collaborators

pub mod plugin;
pub mod gateway;

pub use plugin::{executor_fn, handler_fn, service_fn, CommandExecutor, EventHandler, Service};
pub use gateway::{CommandRegistrar, Gateway, InteractionResponder, SyncTarget};
