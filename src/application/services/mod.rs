//! Application services - Startup orchestration around discovered modules

pub mod command_sync;
pub mod initializer;

pub use command_sync::{RegistrationOutcome, RemoteCommandSync};
pub use initializer::{ServiceInitializer, ServiceReport};
