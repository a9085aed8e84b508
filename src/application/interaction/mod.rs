//! Interaction handling - Command invocation and response tracking

pub mod context;
pub mod executor;

pub use context::{CommandContext, Recovery, ResponseState};
pub use executor::{InteractionExecutor, InvocationOutcome};
