use super::User;
use chrono::{DateTime, Utc};

/// A plain chat message delivered through `messageCreate`
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub author: User,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(channel_id: impl Into<String>, author: User, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            channel_id: channel_id.into(),
            guild_id: None,
            author,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}
