//! Dependency graph derivation
//!
//! [`GraphBuilder`] walks a catalog and produces a [`DependencyGraph`]: every
//! module reachable from the requested roots mapped to its direct
//! dependencies. Building a graph never runs a module and never looks at a
//! resolver's cache, so it is safe at any time.

pub mod export;
pub mod order;

pub use export::GraphExportFormat;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

use crate::module::registry::ModuleCatalog;
use crate::module::traits::ModuleError;

/// Module name -> names of its direct dependencies
///
/// Ordered maps keep iteration and every export deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    adjacency: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Build a graph from an adjacency map
    pub fn from_adjacency(adjacency: BTreeMap<String, BTreeSet<String>>) -> Self {
        Self { adjacency }
    }

    /// Direct dependencies of `name`, if it is in the graph
    pub fn dependencies_of(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.adjacency.get(name)
    }

    /// Modules in the graph that depend directly on `name`
    pub fn dependents_of(&self, name: &str) -> BTreeSet<&str> {
        self.adjacency
            .iter()
            .filter(|(_, deps)| deps.contains(name))
            .map(|(module, _)| module.as_str())
            .collect()
    }

    /// Modules nothing else in the graph depends on
    pub fn roots(&self) -> BTreeSet<&str> {
        let depended_on: HashSet<&str> = self
            .adjacency
            .values()
            .flat_map(|deps| deps.iter().map(String::as_str))
            .collect();
        self.adjacency
            .keys()
            .map(String::as_str)
            .filter(|name| !depended_on.contains(name))
            .collect()
    }

    /// Every `(module, dependency)` edge, sorted
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.adjacency.iter().flat_map(|(module, deps)| {
            deps.iter()
                .map(move |dep| (module.as_str(), dep.as_str()))
        })
    }

    /// Module names in the graph, sorted
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adjacency.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.adjacency
    }
}

/// Derives dependency graphs from a catalog
pub struct GraphBuilder<'a, A> {
    catalog: &'a ModuleCatalog<A>,
}

impl<'a, A> GraphBuilder<'a, A> {
    pub fn new(catalog: &'a ModuleCatalog<A>) -> Self {
        Self { catalog }
    }

    /// Graph of everything reachable from `root`, `root` included
    pub fn build_graph(&self, root: &str) -> Result<DependencyGraph, ModuleError> {
        self.build_graph_from([root])
    }

    /// Graph of everything reachable from any of `roots`
    pub fn build_graph_from<I, S>(&self, roots: I) -> Result<DependencyGraph, ModuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut adjacency: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut pending: Vec<String> = roots.into_iter().map(|r| r.as_ref().to_string()).collect();
        pending.reverse();

        while let Some(name) = pending.pop() {
            if adjacency.contains_key(&name) {
                continue;
            }

            let module = self.catalog.lookup(&name)?;
            let dependencies: BTreeSet<String> =
                module.dependencies().into_iter().map(String::from).collect();
            pending.extend(
                dependencies
                    .iter()
                    .filter(|dep| !adjacency.contains_key(*dep))
                    .cloned(),
            );
            adjacency.insert(name, dependencies);
        }

        debug!("Built dependency graph with {} modules", adjacency.len());
        Ok(DependencyGraph { adjacency })
    }

    /// Graph of the whole catalog
    pub fn full_graph(&self) -> Result<DependencyGraph, ModuleError> {
        self.build_graph_from(self.catalog.names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::traits::Module;

    fn unit(name: &str, deps: &[&str]) -> Module<()> {
        Module::new(name, |_| Ok(())).depends_on(deps.iter().copied())
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn catalog() -> ModuleCatalog<()> {
        ModuleCatalog::from_modules(vec![
            unit("FX", &[]),
            unit("A", &["FX"]),
            unit("B", &["A"]),
            unit("C", &["A", "B"]),
            unit("Unrelated", &[]),
        ])
        .unwrap()
    }

    #[test]
    fn test_graph_shape_from_root() {
        let catalog = catalog();
        let graph = GraphBuilder::new(&catalog).build_graph("C").unwrap();

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.dependencies_of("FX"), Some(&set(&[])));
        assert_eq!(graph.dependencies_of("A"), Some(&set(&["FX"])));
        assert_eq!(graph.dependencies_of("B"), Some(&set(&["A"])));
        assert_eq!(graph.dependencies_of("C"), Some(&set(&["A", "B"])));
        assert!(!graph.contains("Unrelated"));
    }

    #[test]
    fn test_leaf_root_maps_to_empty_set() {
        let catalog = catalog();
        let graph = GraphBuilder::new(&catalog).build_graph("FX").unwrap();
        assert_eq!(graph.len(), 1);
        assert!(graph.dependencies_of("FX").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_root_is_not_found() {
        let catalog = catalog();
        assert!(matches!(
            GraphBuilder::new(&catalog).build_graph("X"),
            Err(ModuleError::NotFound(ref n)) if n == "X"
        ));
    }

    #[test]
    fn test_cycles_are_walked_without_looping() {
        let catalog =
            ModuleCatalog::from_modules(vec![unit("A", &["B"]), unit("B", &["A"])]).unwrap();
        let graph = GraphBuilder::new(&catalog).build_graph("A").unwrap();
        assert_eq!(graph.edges().collect::<Vec<_>>(), vec![("A", "B"), ("B", "A")]);
    }

    #[test]
    fn test_multiple_roots_and_queries() {
        let catalog = catalog();
        let builder = GraphBuilder::new(&catalog);
        let graph = builder.build_graph_from(["B", "Unrelated"]).unwrap();

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.roots(), BTreeSet::from(["B", "Unrelated"]));
        assert_eq!(graph.dependents_of("A"), BTreeSet::from(["B"]));
        assert_eq!(builder.full_graph().unwrap().len(), 5);
    }
}
