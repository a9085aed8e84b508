use serde::Serialize;

/// Red used for error embeds
pub const COLOR_RED: u32 = 0xED4245;

/// Rich embed attached to a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
}

impl Embed {
    pub fn new() -> Self {
        Self {
            title: None,
            description: None,
            color: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }
}

impl Default for Embed {
    fn default() -> Self {
        Self::new()
    }
}

/// Body of a reply or follow-up
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResponsePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    #[serde(skip)]
    pub ephemeral: bool,
}

impl ResponsePayload {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            ..Self::default()
        }
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    /// The generic terminal response sent when a command fails
    pub fn interaction_error() -> Self {
        Self::embed(
            Embed::new()
                .with_title("Interaction Error")
                .with_description(
                    "An internal interaction error has occurred! Please try again later",
                )
                .with_color(COLOR_RED),
        )
    }

    pub fn is_error(&self) -> bool {
        self.embeds.iter().any(|e| e.color == Some(COLOR_RED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_error_payload() {
        let payload = ResponsePayload::interaction_error();
        assert!(payload.is_error());
        assert_eq!(payload.embeds[0].title.as_deref(), Some("Interaction Error"));

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["embeds"][0]["color"], 0xED4245);
        assert!(json.get("content").is_none());
        assert!(json.get("ephemeral").is_none());
    }

    #[test]
    fn test_text_payload_is_not_error() {
        assert!(!ResponsePayload::text("Pong!").is_error());
    }
}
