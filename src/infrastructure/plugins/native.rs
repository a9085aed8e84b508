//! Native modules - Shared libraries exporting a module entry point

use async_trait::async_trait;
use libloading::{Library, Symbol};
use std::path::Path;

use super::loader::Importer;
use crate::application::errors::LoadError;
use crate::domain::entities::PluginModule;

/// Symbol every native module must export
pub const ENTRY_SYMBOL: &[u8] = b"herald_module";

/// Entry point signature; returns a `Box<PluginModule>` turned into a raw pointer
pub type ModuleEntryFn = unsafe extern "C" fn() -> *mut PluginModule;

/// Imports `*.so`, `*.dylib` and `*.dll` files.
///
/// The library must be built against the same version of this crate.
pub struct NativeImporter;

#[async_trait]
impl Importer for NativeImporter {
    fn accepts(&self, path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("so") | Some("dylib") | Some("dll")
        )
    }

    async fn import(&self, path: &Path) -> Result<PluginModule, LoadError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || load_library(&path))
            .await
            .map_err(|e| LoadError::Library(format!("Loader task failed: {}", e)))?
    }
}

fn load_library(path: &Path) -> Result<PluginModule, LoadError> {
    let library = unsafe { Library::new(path) }
        .map_err(|e| LoadError::Library(format!("Failed to load library: {}", e)))?;

    let module = unsafe {
        let entry: Symbol<ModuleEntryFn> = library
            .get(ENTRY_SYMBOL)
            .map_err(|e| LoadError::Library(format!("Failed to find module entry point: {}", e)))?;
        let raw = entry();
        if raw.is_null() {
            return Err(LoadError::Library("Module entry point returned null".to_string()));
        }
        Box::from_raw(raw)
    };

    // Executors and handlers point into the library's code for as long as
    // the process runs, so it is never unloaded.
    std::mem::forget(library);

    tracing::info!("Loaded native module: {}", path.display());
    Ok(*module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_library_extensions() {
        for file in ["libping.so", "ping.dylib", "ping.dll"] {
            assert!(NativeImporter.accepts(Path::new(file)));
        }
        assert!(!NativeImporter.accepts(Path::new("ping.yaml")));
    }

    #[tokio::test]
    async fn test_invalid_library_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.so");
        std::fs::write(&path, b"definitely not an ELF file").unwrap();

        let result = NativeImporter.import(&path).await;
        assert!(matches!(result, Err(LoadError::Library(_))));
    }
}
