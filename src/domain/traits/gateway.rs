use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::application::client::Client;
use crate::application::errors::{GatewayError, RegistrationError, ResponseError};
use crate::domain::entities::{Interaction, ResponsePayload};

/// Connection collaborator - owns the session with the platform
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Log in and deliver events into `client` until the session ends.
    ///
    /// Implementations emit `ready` exactly once after a successful login.
    async fn login(&self, token: &str, client: Arc<Client>) -> Result<(), GatewayError>;
}

/// Interaction response capability of the platform
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    /// Initial response to an interaction
    async fn reply(&self, interaction: &Interaction, payload: &ResponsePayload) -> Result<(), ResponseError>;

    /// Acknowledge now, respond later
    async fn defer_reply(&self, interaction: &Interaction, ephemeral: bool) -> Result<(), ResponseError>;

    /// Additional message after the interaction was acknowledged
    async fn follow_up(&self, interaction: &Interaction, payload: &ResponsePayload) -> Result<(), ResponseError>;
}

/// Where commands are registered on the remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    pub application_id: String,
    /// Guild-scoped registration when set, global otherwise
    pub guild_id: Option<String>,
}

/// Remote command registration endpoint
#[async_trait]
pub trait CommandRegistrar: Send + Sync {
    /// Replace the remote command set with `commands`
    async fn put_commands(&self, target: &SyncTarget, commands: &[Value]) -> Result<(), RegistrationError>;
}
