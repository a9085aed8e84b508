use super::{ChatMessage, Interaction, User};

/// Fired once after a successful login
pub const READY: &str = "ready";
/// Fired for every inbound interaction
pub const INTERACTION_CREATE: &str = "interactionCreate";
/// Fired for every plain chat message
pub const MESSAGE_CREATE: &str = "messageCreate";

/// Session details delivered with `ready`
#[derive(Debug, Clone)]
pub struct ReadyInfo {
    pub user: User,
    pub application_id: String,
    pub guild_count: usize,
}

/// An event delivered by the connection
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Ready(ReadyInfo),
    InteractionCreate(Interaction),
    MessageCreate(ChatMessage),
    Custom {
        name: String,
        payload: serde_json::Value,
    },
}

impl GatewayEvent {
    /// Name used for subscriptions and event folders
    pub fn name(&self) -> &str {
        match self {
            GatewayEvent::Ready(_) => READY,
            GatewayEvent::InteractionCreate(_) => INTERACTION_CREATE,
            GatewayEvent::MessageCreate(_) => MESSAGE_CREATE,
            GatewayEvent::Custom { name, .. } => name,
        }
    }

    pub fn custom(name: impl Into<String>, payload: serde_json::Value) -> Self {
        GatewayEvent::Custom {
            name: name.into(),
            payload,
        }
    }
}
