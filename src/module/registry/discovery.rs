//! Module discovery
//!
//! Finds the singleton modules declared in a namespace. Discovery is a
//! pluggable collaborator: [`StaticDiscovery`] serves a compiled-in
//! registration manifest, [`ManifestDiscovery`] reads `<namespace>.toml`
//! files and binds them to compiled-in computations.
//!
//! Both apply the same filtering contract: only already-existing singleton
//! modules are returned. Plain types (even ones sharing a module's name) and
//! module-shaped classes that would need instantiating are skipped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::module::registry::manifest::NamespaceManifest;
use crate::module::traits::{Computation, Module, ModuleError, ModuleInputs};
use crate::module::validation::{ManifestValidator, ValidationResult};

/// Discovery collaborator contract
pub trait ModuleDiscovery<A> {
    /// Concrete singleton modules declared in `namespace`, in no particular order
    fn discover(&self, namespace: &str) -> Result<Vec<Module<A>>, ModuleError>;
}

/// A declaration inside a namespace
pub enum Declaration<A> {
    /// An already-existing module instance
    Singleton(Module<A>),
    /// A plain type that is not a module
    PlainType { name: String },
    /// A module-shaped class that would have to be instantiated first
    Class {
        name: String,
        dependencies: Vec<String>,
    },
}

impl<A> Declaration<A> {
    /// Declared name
    pub fn name(&self) -> &str {
        match self {
            Declaration::Singleton(module) => module.name(),
            Declaration::PlainType { name } | Declaration::Class { name, .. } => name.as_str(),
        }
    }
}

/// Discovery over a compiled-in registration manifest
pub struct StaticDiscovery<A> {
    namespaces: HashMap<String, Vec<Declaration<A>>>,
}

impl<A> StaticDiscovery<A> {
    pub fn new() -> Self {
        Self {
            namespaces: HashMap::new(),
        }
    }

    /// Add a declaration to a namespace
    pub fn declare(mut self, namespace: impl Into<String>, declaration: Declaration<A>) -> Self {
        self.namespaces
            .entry(namespace.into())
            .or_default()
            .push(declaration);
        self
    }

    /// Declare a singleton module
    pub fn singleton(self, namespace: impl Into<String>, module: Module<A>) -> Self {
        self.declare(namespace, Declaration::Singleton(module))
    }

    /// Declare a plain, non-module type
    pub fn plain_type(self, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        self.declare(namespace, Declaration::PlainType { name: name.into() })
    }

    /// Declare a module-shaped class that is not a singleton
    pub fn class<I, S>(self, namespace: impl Into<String>, name: impl Into<String>, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declare(
            namespace,
            Declaration::Class {
                name: name.into(),
                dependencies: deps.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// All declarations in a namespace, singleton or not
    pub fn declarations(&self, namespace: &str) -> &[Declaration<A>] {
        self.namespaces
            .get(namespace)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl<A> Default for StaticDiscovery<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> ModuleDiscovery<A> for StaticDiscovery<A> {
    fn discover(&self, namespace: &str) -> Result<Vec<Module<A>>, ModuleError> {
        let declarations = self.declarations(namespace);
        if declarations.is_empty() {
            debug!("Namespace {} has no declarations", namespace);
        }

        let modules: Vec<Module<A>> = declarations
            .iter()
            .filter_map(|declaration| match declaration {
                Declaration::Singleton(module) => Some(module.clone()),
                Declaration::PlainType { name } | Declaration::Class { name, .. } => {
                    debug!("Skipping non-singleton declaration {} in {}", name, namespace);
                    None
                }
            })
            .collect();

        info!("Discovered {} modules in namespace {}", modules.len(), namespace);
        Ok(modules)
    }
}

/// Computations compiled into the application, keyed by binding name
pub struct ComputationTable<A> {
    computations: HashMap<String, Arc<dyn Computation<A>>>,
}

impl<A> ComputationTable<A> {
    pub fn new() -> Self {
        Self {
            computations: HashMap::new(),
        }
    }

    /// Bind a closure under `key`
    pub fn bind<F>(mut self, key: impl Into<String>, run: F) -> Self
    where
        F: Fn(&ModuleInputs<A>) -> anyhow::Result<A> + Send + Sync + 'static,
    {
        self.computations.insert(key.into(), Arc::new(run));
        self
    }

    /// Bind a [`Computation`] implementation under `key`
    pub fn bind_computation<C>(mut self, key: impl Into<String>, computation: C) -> Self
    where
        C: Computation<A> + 'static,
    {
        self.computations.insert(key.into(), Arc::new(computation));
        self
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn Computation<A>>> {
        self.computations.get(key).cloned()
    }
}

impl<A> Default for ComputationTable<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Discovery over `<namespace>.toml` manifests in a directory
pub struct ManifestDiscovery<A> {
    /// Directory holding namespace manifests
    manifest_dir: PathBuf,
    /// Computations singletons are bound to
    computations: ComputationTable<A>,
    validator: ManifestValidator,
}

impl<A> ManifestDiscovery<A> {
    /// Create a discovery scanner over `manifest_dir`
    pub fn new<P: AsRef<Path>>(manifest_dir: P, computations: ComputationTable<A>) -> Self {
        Self {
            manifest_dir: manifest_dir.as_ref().to_path_buf(),
            computations,
            validator: ManifestValidator::new(),
        }
    }

    /// Path of the manifest describing `namespace`
    pub fn manifest_path(&self, namespace: &str) -> PathBuf {
        self.manifest_dir.join(format!("{}.toml", namespace))
    }
}

impl<A> ModuleDiscovery<A> for ManifestDiscovery<A> {
    fn discover(&self, namespace: &str) -> Result<Vec<Module<A>>, ModuleError> {
        if !self.validator.is_valid_name(namespace) {
            return Err(ModuleError::InvalidManifest(format!(
                "Invalid namespace identifier: {:?}",
                namespace
            )));
        }

        let manifest_path = self.manifest_path(namespace);
        if !manifest_path.exists() {
            debug!("No manifest for namespace {} at {:?}", namespace, manifest_path);
            return Ok(Vec::new());
        }

        let manifest = NamespaceManifest::from_file(&manifest_path)?;
        if let ValidationResult::Invalid(errors) = self.validator.validate(namespace, &manifest) {
            return Err(ModuleError::InvalidManifest(format!(
                "{:?}: {}",
                manifest_path,
                errors.join("; ")
            )));
        }

        let mut modules = Vec::new();
        for declaration in manifest.singletons() {
            let computation = self
                .computations
                .get(declaration.computation_key())
                .ok_or_else(|| ModuleError::UnboundComputation {
                    namespace: namespace.to_string(),
                    name: declaration.name.clone(),
                })?;

            modules.push(
                Module::from_shared(declaration.name.clone(), computation)
                    .with_description(declaration.description.clone().unwrap_or_default())
                    .depends_on(declaration.dependencies.iter().cloned()),
            );
        }

        info!(
            "Discovered {} modules in namespace {} ({} declarations)",
            modules.len(),
            namespace,
            manifest.declarations.len()
        );
        Ok(modules)
    }
}
