//! Console adapter for development/testing
//!
//! Lines read from stdin become events: `/name key=value ...` is a command
//! invocation, anything else a plain message.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::application::client::Client;
use crate::application::errors::{GatewayError, ResponseError};
use crate::domain::entities::{ChatMessage, GatewayEvent, Interaction, ReadyInfo, ResponsePayload, User};
use crate::domain::traits::{Gateway, InteractionResponder};

const CONSOLE_CHANNEL: &str = "console";

/// Gateway backed by the local terminal
pub struct ConsoleGateway {
    user: User,
}

impl ConsoleGateway {
    pub fn new() -> Self {
        Self {
            user: User::new("console").with_username("console"),
        }
    }

    /// Turn one input line into an event; blank lines yield nothing
    pub fn parse_line(&self, line: &str, application_id: &str) -> Option<GatewayEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let Some(invocation) = line.strip_prefix('/') else {
            let message = ChatMessage::new(CONSOLE_CHANNEL, self.user.clone(), line);
            return Some(GatewayEvent::MessageCreate(message));
        };

        let mut parts = invocation.split_whitespace();
        let name = parts.next()?;
        let mut interaction = Interaction::command(name, self.user.clone())
            .with_application(application_id)
            .with_channel(CONSOLE_CHANNEL);

        // Words without `=` continue the previous option's value
        let mut options: Vec<(String, String)> = Vec::new();
        for part in parts {
            match part.split_once('=') {
                Some((key, value)) if !key.is_empty() => options.push((key.to_string(), value.to_string())),
                _ => match options.last_mut() {
                    Some((_, value)) => {
                        value.push(' ');
                        value.push_str(part);
                    }
                    None => tracing::warn!("Ignoring stray argument: {}", part),
                },
            }
        }
        for (key, raw) in options {
            interaction = interaction.with_option(key, option_value(&raw));
        }

        Some(GatewayEvent::InteractionCreate(interaction))
    }

    /// Emit one event per input line until `reader` is exhausted.
    ///
    /// Lines are decoded lossily, so stray bytes never end the session.
    pub async fn pump<R>(&self, mut reader: R, client: &Client) -> Result<(), GatewayError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|e| GatewayError::Connection(e.to_string()))?;
            if read == 0 {
                return Ok(());
            }
            let line = String::from_utf8_lossy(&buf);
            if let Some(event) = self.parse_line(&line, client.application_id()) {
                client.emit(event);
            }
        }
    }
}

impl Default for ConsoleGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Numbers and booleans keep their type, everything else is a string
fn option_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}

#[async_trait]
impl Gateway for ConsoleGateway {
    async fn login(&self, _token: &str, client: Arc<Client>) -> Result<(), GatewayError> {
        tracing::info!("Starting console session (dev mode)");
        client.emit(GatewayEvent::Ready(ReadyInfo {
            user: User::new("0").with_username("herald").as_bot(),
            application_id: client.application_id().to_string(),
            guild_count: 0,
        }));

        self.pump(BufReader::new(tokio::io::stdin()), &client).await?;

        tracing::info!("Console input closed");
        Ok(())
    }
}

/// Prints interaction responses to stdout
#[derive(Debug, Default)]
pub struct ConsoleResponder;

impl ConsoleResponder {
    fn print(&self, interaction: &Interaction, payload: &ResponsePayload) {
        if let Some(content) = &payload.content {
            println!("[BOT /{}] {}", interaction.command_name, content);
        }
        for embed in &payload.embeds {
            println!(
                "[BOT /{}] {}: {}",
                interaction.command_name,
                embed.title.as_deref().unwrap_or_default(),
                embed.description.as_deref().unwrap_or_default()
            );
        }
    }
}

#[async_trait]
impl InteractionResponder for ConsoleResponder {
    async fn reply(&self, interaction: &Interaction, payload: &ResponsePayload) -> Result<(), ResponseError> {
        self.print(interaction, payload);
        Ok(())
    }

    async fn defer_reply(&self, interaction: &Interaction, ephemeral: bool) -> Result<(), ResponseError> {
        let scope = if ephemeral { " (ephemeral)" } else { "" };
        println!("[BOT /{}] is thinking...{}", interaction.command_name, scope);
        Ok(())
    }

    async fn follow_up(&self, interaction: &Interaction, payload: &ResponsePayload) -> Result<(), ResponseError> {
        self.print(interaction, payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_command_with_options() {
        let gateway = ConsoleGateway::new();
        let event = gateway.parse_line("/echo text=hello world count=3 loud=true", "app").unwrap();

        let GatewayEvent::InteractionCreate(interaction) = event else {
            panic!("expected an interaction");
        };
        assert!(interaction.is_chat_input_command());
        assert_eq!(interaction.command_name, "echo");
        assert_eq!(interaction.application_id, "app");
        assert_eq!(interaction.option_str("text"), Some("hello world"));
        assert_eq!(interaction.option("count"), Some(&json!(3)));
        assert_eq!(interaction.option("loud"), Some(&json!(true)));
    }

    #[test]
    fn test_parse_plain_text_and_blank() {
        let gateway = ConsoleGateway::new();
        let event = gateway.parse_line("hello there", "app").unwrap();
        assert!(matches!(event, GatewayEvent::MessageCreate(ref m) if m.content == "hello there"));
        assert!(gateway.parse_line("   ", "app").is_none());
        assert!(gateway.parse_line("/", "app").is_none());
    }

    #[tokio::test]
    async fn test_undecodable_line_does_not_end_the_session() {
        use crate::infrastructure::adapters::memory::{MemoryGateway, RecordingResponder};
        use std::sync::Mutex;

        let client = Client::builder(Arc::new(MemoryGateway::new()), Arc::new(RecordingResponder::new()))
            .with_application_id("app")
            .build();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = seen.clone();
        client.on(
            "interactionCreate",
            Arc::new(move |event: &GatewayEvent| {
                if let GatewayEvent::InteractionCreate(interaction) = event {
                    record.lock().unwrap().push(interaction.command_name.clone());
                }
            }),
        );

        let input: &[u8] = b"/ping\n\xff\xfe bad\n/echo text=hi\n";
        ConsoleGateway::new().pump(input, &client).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["ping", "echo"]);
    }
}
