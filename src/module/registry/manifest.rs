//! Namespace manifest parsing
//!
//! Handles parsing `<namespace>.toml` manifests that declare the modules,
//! plain types and module-shaped classes living in a namespace.

use crate::module::traits::ModuleError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kind of a declaration inside a namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    /// An already-existing module instance
    Singleton,
    /// A plain type that is not a module, even if it shares a module's name
    Type,
    /// A module-shaped class that would have to be instantiated first
    Class,
}

/// One `[[declarations]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclarationManifest {
    /// Declared name
    pub name: String,
    /// Declaration kind
    pub kind: DeclarationKind,
    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,
    /// Dependency names, in order
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Computation table key (defaults to `name`)
    #[serde(default)]
    pub computation: Option<String>,
}

impl DeclarationManifest {
    /// Key used to bind this declaration to a compiled-in computation
    pub fn computation_key(&self) -> &str {
        self.computation.as_deref().unwrap_or(&self.name)
    }
}

/// Namespace manifest (`<namespace>.toml` structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamespaceManifest {
    /// Declarations in this namespace
    #[serde(default)]
    pub declarations: Vec<DeclarationManifest>,
}

impl NamespaceManifest {
    /// Load manifest from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModuleError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ModuleError::InvalidManifest(format!(
                "Failed to read manifest file {:?}: {}",
                path.as_ref(),
                e
            ))
        })?;

        Self::parse(&contents)
    }

    /// Parse manifest TOML
    pub fn parse(contents: &str) -> Result<Self, ModuleError> {
        toml::from_str(contents).map_err(|e| {
            ModuleError::InvalidManifest(format!("Failed to parse manifest TOML: {}", e))
        })
    }

    /// Declarations that are concrete singleton modules
    pub fn singletons(&self) -> impl Iterator<Item = &DeclarationManifest> {
        self.declarations
            .iter()
            .filter(|d| d.kind == DeclarationKind::Singleton)
    }
}
