//! Module loader - Discovers module files in a directory and imports them

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::catalog::ModuleCatalog;
use super::manifest::ManifestImporter;
use super::native::NativeImporter;
use crate::application::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::application::errors::LoadError;
use crate::domain::entities::{LoadedModule, PluginModule};

/// Turns one module file into a [`PluginModule`]
#[async_trait]
pub trait Importer: Send + Sync {
    /// Whether this importer handles `path`
    fn accepts(&self, path: &Path) -> bool;

    async fn import(&self, path: &Path) -> Result<PluginModule, LoadError>;
}

/// Directory scanner over a set of importers.
///
/// Never fails as a whole: a missing directory is empty and a broken file
/// becomes a failed [`LoadedModule`].
#[derive(Default)]
pub struct ModuleLoader {
    importers: Vec<Arc<dyn Importer>>,
}

impl ModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manifest modules resolved against `catalog`, plus native libraries
    pub fn standard(catalog: Arc<ModuleCatalog>) -> Self {
        Self::new()
            .with_importer(Arc::new(ManifestImporter::new(catalog)))
            .with_importer(Arc::new(NativeImporter))
    }

    pub fn with_importer(mut self, importer: Arc<dyn Importer>) -> Self {
        self.importers.push(importer);
        self
    }

    /// Import every module file directly inside `dir`, in file-name order
    pub async fn load(&self, dir: &Path, sink: &dyn DiagnosticSink) -> Vec<LoadedModule> {
        let mut modules = Vec::new();

        for path in list_entries(dir, false).await {
            let Some(importer) = self.importers.iter().find(|i| i.accepts(&path)) else {
                tracing::trace!("Skipping non-module file: {}", path.display());
                continue;
            };

            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let result = importer.import(&path).await;

            let loaded = LoadedModule { name, path, result };
            match &loaded.result {
                Ok(_) => tracing::debug!("Loaded module {}", loaded.path.display()),
                Err(e) => sink.report(Diagnostic::new(
                    DiagnosticKind::Load,
                    loaded.file_name(),
                    format!("Error requiring module \"{}\": {}", loaded.file_name(), e),
                )),
            }
            modules.push(loaded);
        }

        modules
    }

    /// Load each direct subdirectory of `dir` as a group named after it
    pub async fn load_grouped(&self, dir: &Path, sink: &dyn DiagnosticSink) -> Vec<(String, Vec<LoadedModule>)> {
        let mut groups = Vec::new();
        for sub in list_entries(dir, true).await {
            let Some(group) = sub.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let modules = self.load(&sub, sink).await;
            groups.push((group, modules));
        }
        groups
    }
}

/// Sorted, non-hidden entries of `dir`; directories only or files only
async fn list_entries(dir: &Path, directories: bool) -> Vec<PathBuf> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Module directory does not exist: {}", dir.display());
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!("Failed to read module directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut paths = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed to read directory entry in {}: {}", dir.display(), e);
                break;
            }
        };

        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let is_dir = match entry.file_type().await {
            Ok(file_type) => file_type.is_dir(),
            Err(_) => continue,
        };
        if is_dir == directories {
            paths.push(entry.path());
        }
    }

    paths.sort();
    paths
}
