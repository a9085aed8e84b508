//! Application layer - Startup orchestration and invocation handling
//!
//! This layer contains:
//! - Registry: Validated commands keyed by name
//! - Dispatcher: Event handler bindings
//! - Services: Service initialization and remote command sync
//! - Interaction: Command execution and the response state machine
//! - Bootstrap: The startup sequence tying it all together

pub mod errors;
pub mod diagnostics;
pub mod fault;
pub mod client;
pub mod registry;
pub mod dispatcher;
pub mod interaction;
pub mod services;
pub mod bootstrap;

pub use bootstrap::{Bootstrap, BootstrapOptions, Discovery, Runtime};
pub use client::Client;
pub use registry::{CommandRegistry, DuplicatePolicy, RegisterTally};
