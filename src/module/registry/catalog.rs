//! Module catalog
//!
//! Registry of all modules known to one application instance, keyed by
//! unique name and kept in registration order.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::config::DiscoveryConfig;
use crate::module::registry::discovery::{ComputationTable, ManifestDiscovery, ModuleDiscovery};
use crate::module::traits::{Module, ModuleError};

/// Registry of modules keyed by unique name
///
/// Registration happens once at startup; afterwards the catalog is shared
/// read-only (usually behind an `Arc`) by resolvers and graph builders.
pub struct ModuleCatalog<A> {
    /// Modules in registration order
    modules: Vec<Module<A>>,
    /// Module name -> position in `modules`
    index: HashMap<String, usize>,
}

impl<A> ModuleCatalog<A> {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build a catalog from modules, failing on the first name collision
    pub fn from_modules<I>(modules: I) -> Result<Self, ModuleError>
    where
        I: IntoIterator<Item = Module<A>>,
    {
        let mut catalog = Self::new();
        for module in modules {
            catalog.register(module)?;
        }
        Ok(catalog)
    }

    /// Build a catalog from the namespaces a discovery configuration lists
    ///
    /// Each namespace is read from `<manifest_dir>/<namespace>.toml` and
    /// registered in the configured order.
    pub fn from_discovery_config(
        config: &DiscoveryConfig,
        computations: ComputationTable<A>,
    ) -> Result<Self, ModuleError> {
        let discovery = ManifestDiscovery::new(&config.manifest_dir, computations);
        let mut catalog = Self::new();
        for namespace in &config.namespaces {
            catalog.register_discovered(&discovery, namespace)?;
        }

        info!(
            "Built catalog of {} modules from {} namespaces in {:?}",
            catalog.len(),
            config.namespaces.len(),
            config.manifest_dir
        );
        Ok(catalog)
    }

    /// Register a module
    pub fn register(&mut self, module: Module<A>) -> Result<(), ModuleError> {
        if self.index.contains_key(module.name()) {
            return Err(ModuleError::DuplicateName(module.name().to_string()));
        }

        debug!(
            "Registering module {} (dependencies: {:?})",
            module.name(),
            module.dependencies()
        );
        self.index.insert(module.name().to_string(), self.modules.len());
        self.modules.push(module);
        Ok(())
    }

    /// Register every module a discovery collaborator finds in `namespace`
    ///
    /// Discovery results carry no order, so they are registered sorted by
    /// name. Either every module is registered or, on a name clash, none
    /// is. Returns the number of modules registered.
    pub fn register_discovered<D>(
        &mut self,
        discovery: &D,
        namespace: &str,
    ) -> Result<usize, ModuleError>
    where
        D: ModuleDiscovery<A> + ?Sized,
    {
        let mut discovered = discovery.discover(namespace)?;
        discovered.sort_by(|a, b| a.name().cmp(b.name()));

        let mut incoming = HashSet::new();
        if let Some(clash) = discovered
            .iter()
            .map(Module::name)
            .find(|name| self.index.contains_key(*name) || !incoming.insert(*name))
        {
            return Err(ModuleError::DuplicateName(clash.to_string()));
        }

        let count = discovered.len();
        for module in discovered {
            self.register(module)?;
        }

        info!("Registered {} modules from namespace {}", count, namespace);
        Ok(count)
    }

    /// Look up a module by name
    pub fn lookup(&self, name: &str) -> Result<&Module<A>, ModuleError> {
        self.index
            .get(name)
            .map(|&i| &self.modules[i])
            .ok_or_else(|| ModuleError::NotFound(name.to_string()))
    }

    /// All registered modules in registration order
    pub fn all(&self) -> &[Module<A>] {
        &self.modules
    }

    /// Registered module names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(Module::name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl<A> Default for ModuleCatalog<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for ModuleCatalog<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleCatalog")
            .field("modules", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
