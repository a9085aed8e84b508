//! Module catalog - In-process implementations that manifests refer to by name

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::traits::{CommandExecutor, EventHandler, Service};

#[derive(Default, Clone)]
pub struct ModuleCatalog {
    executors: HashMap<String, Arc<dyn CommandExecutor>>,
    handlers: HashMap<String, Arc<dyn EventHandler>>,
    services: HashMap<String, Arc<dyn Service>>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_executor(mut self, name: impl Into<String>, executor: Arc<dyn CommandExecutor>) -> Self {
        self.executors.insert(name.into(), executor);
        self
    }

    pub fn with_handler(mut self, name: impl Into<String>, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    pub fn with_service(mut self, name: impl Into<String>, service: Arc<dyn Service>) -> Self {
        self.services.insert(name.into(), service);
        self
    }

    pub fn executor(&self, name: &str) -> Option<Arc<dyn CommandExecutor>> {
        self.executors.get(name).cloned()
    }

    pub fn handler(&self, name: &str) -> Option<Arc<dyn EventHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn service(&self, name: &str) -> Option<Arc<dyn Service>> {
        self.services.get(name).cloned()
    }

    /// Sorted names of every executor, handler and service
    pub fn symbols(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .executors
            .keys()
            .chain(self.handlers.keys())
            .chain(self.services.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
