use super::User;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// Kind of inbound interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Ping,
    ChatInputCommand,
    Autocomplete,
    Component,
    ModalSubmit,
}

impl InteractionKind {
    pub fn as_str(&self) -> &str {
        match self {
            InteractionKind::Ping => "ping",
            InteractionKind::ChatInputCommand => "chat-input-command",
            InteractionKind::Autocomplete => "autocomplete",
            InteractionKind::Component => "component",
            InteractionKind::ModalSubmit => "modal-submit",
        }
    }
}

/// One inbound request from the platform
#[derive(Debug, Clone)]
pub struct Interaction {
    pub id: String,
    /// Continuation token used for replies and follow-ups
    pub token: String,
    pub application_id: String,
    pub kind: InteractionKind,
    pub command_name: String,
    pub options: BTreeMap<String, Value>,
    pub user: User,
    pub guild_id: Option<String>,
    pub channel_id: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl Interaction {
    pub fn new(kind: InteractionKind, command_name: impl Into<String>, user: User) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            token: uuid::Uuid::new_v4().simple().to_string(),
            application_id: String::new(),
            kind,
            command_name: command_name.into(),
            options: BTreeMap::new(),
            user,
            guild_id: None,
            channel_id: None,
            received_at: Utc::now(),
        }
    }

    /// Shorthand for a slash-style command invocation
    pub fn command(name: impl Into<String>, user: User) -> Self {
        Self::new(InteractionKind::ChatInputCommand, name, user)
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn with_application(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = application_id.into();
        self
    }

    pub fn with_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    pub fn is_chat_input_command(&self) -> bool {
        self.kind == InteractionKind::ChatInputCommand
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    pub fn option_str(&self, name: &str) -> Option<&str> {
        self.options.get(name).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_interaction() {
        let interaction = Interaction::command("echo", User::new("1"))
            .with_option("text", "hello")
            .with_option("times", 2);

        assert!(interaction.is_chat_input_command());
        assert_eq!(interaction.option_str("text"), Some("hello"));
        assert_eq!(interaction.option("times"), Some(&Value::from(2)));
        assert_eq!(interaction.option_str("times"), None);
        assert_ne!(interaction.id, interaction.token);
    }
}
