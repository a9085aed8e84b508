//! Manifest modules - YAML files naming the capabilities a module exposes

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use super::catalog::ModuleCatalog;
use super::loader::Importer;
use crate::application::errors::LoadError;
use crate::domain::entities::PluginModule;

/// On-disk shape of a manifest module
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleManifest {
    /// Command metadata, forwarded to the remote verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Command executor symbol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute: Option<String>,

    /// Event handler symbol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,

    /// Service init symbol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<String>,
}

impl ModuleManifest {
    pub fn parse(content: &str) -> Result<Self, LoadError> {
        serde_yaml::from_str(content).map_err(|e| LoadError::Parse(e.to_string()))
    }

    /// Resolve every named symbol against `catalog`
    pub fn resolve(&self, catalog: &ModuleCatalog) -> Result<PluginModule, LoadError> {
        let unresolved = |capability: &'static str, symbol: &str| LoadError::UnresolvedSymbol {
            capability,
            symbol: symbol.to_string(),
        };

        let mut module = PluginModule::new();
        module.data = self.data.clone();
        if let Some(symbol) = &self.execute {
            module.execute = Some(catalog.executor(symbol).ok_or_else(|| unresolved("executor", symbol))?);
        }
        if let Some(symbol) = &self.handler {
            module.handler = Some(catalog.handler(symbol).ok_or_else(|| unresolved("handler", symbol))?);
        }
        if let Some(symbol) = &self.init {
            module.init = Some(catalog.service(symbol).ok_or_else(|| unresolved("service", symbol))?);
        }
        Ok(module)
    }
}

/// Imports `*.yaml` / `*.yml` manifests
pub struct ManifestImporter {
    catalog: Arc<ModuleCatalog>,
}

impl ManifestImporter {
    pub fn new(catalog: Arc<ModuleCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Importer for ManifestImporter {
    fn accepts(&self, path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        )
    }

    async fn import(&self, path: &Path) -> Result<PluginModule, LoadError> {
        let content = tokio::fs::read_to_string(path).await?;
        ModuleManifest::parse(&content)?.resolve(&self.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::BoxError;
    use crate::domain::traits::{executor_fn, service_fn};

    #[test]
    fn test_parse_command_manifest() {
        let manifest = ModuleManifest::parse(
            r#"
data:
  name: ban
  description: Ban a member
  options:
    - name: user
      type: 6
      required: true
execute: ban
"#,
        )
        .unwrap();

        let data = manifest.data.as_ref().unwrap();
        assert_eq!(data["name"], "ban");
        assert_eq!(data["options"][0]["type"], 6);
        assert_eq!(manifest.execute.as_deref(), Some("ban"));
        assert!(manifest.handler.is_none());
    }

    #[test]
    fn test_resolve_against_catalog() {
        let catalog = ModuleCatalog::new()
            .with_executor("ban", executor_fn(|_ctx| async { Ok::<(), BoxError>(()) }))
            .with_service("cache", service_fn(|_client| async { Ok::<(), BoxError>(()) }));

        let manifest = ModuleManifest {
            execute: Some("ban".to_string()),
            init: Some("cache".to_string()),
            ..Default::default()
        };
        let module = manifest.resolve(&catalog).unwrap();
        assert!(module.execute.is_some());
        assert!(module.init.is_some());
        assert!(module.data.is_none());

        let missing = ModuleManifest {
            handler: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            missing.resolve(&catalog),
            Err(LoadError::UnresolvedSymbol { capability: "handler", ref symbol }) if symbol == "nope"
        ));
    }
}
