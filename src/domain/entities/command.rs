use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::domain::traits::CommandExecutor;

/// Opaque command schema sent to the remote as-is
#[derive(Debug, Clone, PartialEq)]
pub struct CommandMetadata(Value);

impl CommandMetadata {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The `name` field, if present and a non-empty string
    pub fn name(&self) -> Option<&str> {
        self.0
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
    }

    pub fn description(&self) -> Option<&str> {
        self.0.get("description").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// A validated command
#[derive(Clone)]
pub struct CommandDescriptor {
    pub name: String,
    pub metadata: CommandMetadata,
    pub executor: Arc<dyn CommandExecutor>,
    /// File the command was discovered in
    pub source: String,
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("metadata", &self.metadata)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
