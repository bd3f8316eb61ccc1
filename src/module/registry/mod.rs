//! Module registry and discovery
//!
//! Handles the module catalog, namespace discovery and manifest parsing.

pub mod catalog;
pub mod discovery;
pub mod manifest;

pub use catalog::ModuleCatalog;
pub use discovery::{
    ComputationTable, Declaration, ManifestDiscovery, ModuleDiscovery, StaticDiscovery,
};
pub use manifest::{DeclarationKind, DeclarationManifest, NamespaceManifest};
