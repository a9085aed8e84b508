use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::traits::{CommandExecutor, EventHandler, Service};

/// A module object produced by an importer, before any validation.
///
/// Every capability is optional; the registry, dispatcher and initializer
/// decide which ones a module must expose.
#[derive(Clone, Default)]
pub struct PluginModule {
    /// Command schema (`data`)
    pub data: Option<serde_json::Value>,
    /// Command executor (`execute`)
    pub execute: Option<Arc<dyn CommandExecutor>>,
    /// Event handler (`handler`)
    pub handler: Option<Arc<dyn EventHandler>>,
    /// Service lifecycle hook (`init`)
    pub init: Option<Arc<dyn Service>>,
}

impl PluginModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.execute = Some(executor);
        self
    }

    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn with_init(mut self, init: Arc<dyn Service>) -> Self {
        self.init = Some(init);
        self
    }
}

impl fmt::Debug for PluginModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginModule")
            .field("data", &self.data)
            .field("execute", &self.execute.is_some())
            .field("handler", &self.handler.is_some())
            .field("init", &self.init.is_some())
            .finish()
    }
}

/// Association between an event name and one handler
#[derive(Clone)]
pub struct EventBinding {
    pub event_name: String,
    pub handler: Arc<dyn EventHandler>,
    /// Module file the handler came from
    pub source: String,
}

impl EventBinding {
    pub fn new(
        event_name: impl Into<String>,
        source: impl Into<String>,
        handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            event_name: event_name.into(),
            handler,
            source: source.into(),
        }
    }
}

/// A discovered service; `init` is optional
#[derive(Clone)]
pub struct ServiceHandle {
    pub name: String,
    pub path: PathBuf,
    pub init: Option<Arc<dyn Service>>,
}

impl ServiceHandle {
    pub fn new(name: impl Into<String>, init: Option<Arc<dyn Service>>) -> Self {
        Self {
            name: name.into(),
            path: PathBuf::new(),
            init,
        }
    }
}

/// One entry produced by module discovery
#[derive(Debug)]
pub struct LoadedModule {
    /// File stem, e.g. `ping` for `ping.yaml`
    pub name: String,
    pub path: PathBuf,
    pub result: Result<PluginModule, crate::application::errors::LoadError>,
}

impl LoadedModule {
    /// File name used to tag diagnostics
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}
