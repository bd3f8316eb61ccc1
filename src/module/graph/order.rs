//! Load order for a dependency graph
//!
//! Determines an order in which modules can run with every dependency
//! before its dependents.

use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

use crate::module::graph::DependencyGraph;
use crate::module::traits::ModuleError;

impl DependencyGraph {
    /// Topological order, dependencies first
    ///
    /// Kahn's algorithm with lexicographic tie-breaking, so the order is
    /// stable for a given graph. Dependencies that are not themselves in the
    /// graph are treated as already satisfied.
    pub fn load_order(&self) -> Result<Vec<String>, ModuleError> {
        let map = self.as_map();
        let mut remaining_deps: HashMap<&str, usize> = HashMap::new();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

        for (module, deps) in map {
            let internal = deps.iter().filter(|dep| map.contains_key(*dep));
            let mut count = 0;
            for dep in internal {
                dependents
                    .entry(dep.as_str())
                    .or_default()
                    .push(module.as_str());
                count += 1;
            }
            remaining_deps.insert(module.as_str(), count);
        }

        let mut ready: BTreeSet<&str> = remaining_deps
            .iter()
            .filter(|&(_, &count)| count == 0)
            .map(|(&module, _)| module)
            .collect();
        let mut order = Vec::with_capacity(map.len());

        while let Some(module) = ready.pop_first() {
            order.push(module.to_string());
            for &dependent in dependents.get(module).into_iter().flatten() {
                if let Some(count) = remaining_deps.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        if order.len() != map.len() {
            let placed: HashSet<&str> = order.iter().map(String::as_str).collect();
            return Err(ModuleError::CyclicDependency {
                path: self.find_cycle(&placed),
            });
        }

        debug!("Load order: {:?}", order);
        Ok(order)
    }

    /// Follow unplaced dependencies from the smallest unplaced module until a
    /// module repeats; every unplaced module has at least one unplaced
    /// dependency, so the walk always closes a cycle.
    fn find_cycle(&self, placed: &HashSet<&str>) -> Vec<String> {
        let map = self.as_map();
        let unplaced = |name: &str| map.contains_key(name) && !placed.contains(name);

        let mut path: Vec<&str> = Vec::new();
        let mut current = map.keys().map(String::as_str).find(|name| unplaced(*name));

        while let Some(name) = current {
            if let Some(start) = path.iter().position(|seen| *seen == name) {
                let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
                cycle.push(name.to_string());
                return cycle;
            }
            path.push(name);
            current = map
                .get(name)
                .and_then(|deps| deps.iter().map(String::as_str).find(|dep| unplaced(*dep)));
        }

        path.into_iter().map(String::from).collect()
    }
}
