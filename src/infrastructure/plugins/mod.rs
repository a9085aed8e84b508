//! Module loading for herald-bot
//!
//! Module files are either YAML manifests whose symbols resolve against an
//! in-process [`ModuleCatalog`], or native shared libraries exporting
//! `herald_module`.

pub mod catalog;
pub mod loader;
pub mod manifest;
pub mod native;

pub use catalog::ModuleCatalog;
pub use loader::{Importer, ModuleLoader};
pub use manifest::{ManifestImporter, ModuleManifest};
pub use native::NativeImporter;
