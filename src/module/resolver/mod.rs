//! Dependency resolution with memoized execution
//!
//! A [`DependencyResolver`] turns a module name into that module's artifact.
//! Dependencies are resolved depth-first in declaration order, each module's
//! computation runs at most once for the lifetime of the resolver, and
//! cycles are reported instead of followed.
//!
//! The traversal keeps its own work stack instead of recursing, so very deep
//! dependency chains do not exhaust the thread's call stack. The order in
//! which modules are visited and run is the same as a recursive walk.

pub mod shared;

pub use shared::SharedResolver;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::module::registry::ModuleCatalog;
use crate::module::traits::{Module, ModuleError, ModuleInputs};

/// Counters describing what a resolver has done so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStats {
    /// Module computations that ran and succeeded
    pub executed: u64,
    /// Requests answered from the cache
    pub cache_hits: u64,
    /// Module computations that ran and failed
    pub failures: u64,
}

/// Cache plus the in-progress stack of the call tree being resolved
struct ResolutionState<A> {
    /// Module name -> artifact; entries are written once
    cache: HashMap<String, A>,
    /// Modules currently being resolved, outermost first
    in_progress: Vec<String>,
    /// Same names as `in_progress`, for constant-time membership checks
    in_progress_set: HashSet<String>,
}

impl<A> ResolutionState<A> {
    fn push(&mut self, name: &str) {
        self.in_progress.push(name.to_string());
        self.in_progress_set.insert(name.to_string());
    }

    fn pop(&mut self) {
        if let Some(name) = self.in_progress.pop() {
            self.in_progress_set.remove(&name);
        }
    }

    fn clear_in_progress(&mut self) {
        self.in_progress.clear();
        self.in_progress_set.clear();
    }

    /// Cycle path if `name` is already being resolved
    fn cycle_through(&self, name: &str) -> Option<Vec<String>> {
        if !self.in_progress_set.contains(name) {
            return None;
        }
        let start = self.in_progress.iter().position(|n| n == name)?;
        let mut path = self.in_progress[start..].to_vec();
        path.push(name.to_string());
        Some(path)
    }
}

/// One module on the work stack
struct Frame<'c, A> {
    module: &'c Module<A>,
    /// Distinct dependencies in declaration order
    dependencies: Vec<&'c str>,
    /// Next dependency to visit
    next: usize,
}

/// Resolves module names to artifacts, running each module at most once
pub struct DependencyResolver<A> {
    catalog: Arc<ModuleCatalog<A>>,
    state: ResolutionState<A>,
    stats: ResolutionStats,
}

impl<A: Clone> DependencyResolver<A> {
    /// Create a resolver with an empty cache over `catalog`
    pub fn new(catalog: Arc<ModuleCatalog<A>>) -> Self {
        Self {
            catalog,
            state: ResolutionState {
                cache: HashMap::new(),
                in_progress: Vec::new(),
                in_progress_set: HashSet::new(),
            },
            stats: ResolutionStats::default(),
        }
    }

    /// Resolve `name` to its artifact
    ///
    /// Cached artifacts are returned without running anything. Otherwise
    /// dependencies are resolved first, in declaration order, and the module's
    /// computation runs with their artifacts as inputs. The first failure
    /// aborts the whole call; artifacts cached before it stay cached.
    pub fn resolve(&mut self, name: &str) -> Result<A, ModuleError> {
        let mut guard = InProgressGuard { resolver: self };
        guard.resolver.resolve_tree(name)
    }

    /// Resolve several targets in order, stopping at the first failure
    pub fn resolve_all<I, S>(&mut self, names: I) -> Result<Vec<A>, ModuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| self.resolve(name.as_ref()))
            .collect()
    }

    fn resolve_tree(&mut self, target: &str) -> Result<A, ModuleError> {
        if let Some(artifact) = self.state.cache.get(target) {
            self.stats.cache_hits += 1;
            debug!("Module {} already resolved, using cached artifact", target);
            return Ok(artifact.clone());
        }

        let catalog = Arc::clone(&self.catalog);
        let mut current = self.enter(&catalog, target)?;
        let mut parents: Vec<Frame<'_, A>> = Vec::new();

        loop {
            if let Some(&dependency) = current.dependencies.get(current.next) {
                current.next += 1;
                if self.state.cache.contains_key(dependency) {
                    self.stats.cache_hits += 1;
                    continue;
                }
                let child = self.enter(&catalog, dependency)?;
                parents.push(std::mem::replace(&mut current, child));
                continue;
            }

            let artifact = self.execute(current.module)?;
            match parents.pop() {
                Some(parent) => current = parent,
                None => return Ok(artifact.clone()),
            }
        }
    }

    /// Mark `name` in progress and open a work frame for it
    fn enter<'c>(
        &mut self,
        catalog: &'c ModuleCatalog<A>,
        name: &str,
    ) -> Result<Frame<'c, A>, ModuleError> {
        if let Some(path) = self.state.cycle_through(name) {
            warn!("Cyclic dependency detected: {}", path.join(" -> "));
            return Err(ModuleError::CyclicDependency { path });
        }

        let module = catalog.lookup(name)?;
        self.state.push(name);
        Ok(Frame {
            module,
            dependencies: module.dependencies(),
            next: 0,
        })
    }

    /// Run a module whose dependencies are all cached, check and cache its artifact
    fn execute(&mut self, module: &Module<A>) -> Result<&A, ModuleError> {
        let mut inputs = ModuleInputs::new();
        for dependency in module.dependencies() {
            let artifact = self
                .state
                .cache
                .get(dependency)
                .ok_or_else(|| ModuleError::NotFound(dependency.to_string()))?;
            inputs.insert(dependency, artifact.clone());
        }

        debug!("Running module {}", module.name());
        let started = Instant::now();
        let outcome = module
            .run(&inputs)
            .map_err(|cause| {
                warn!(
                    "Module {} failed after {:?}: {:#}",
                    module.name(),
                    started.elapsed(),
                    cause
                );
                ModuleError::RunFailure {
                    name: module.name().to_string(),
                    path: self.state.in_progress.clone(),
                    cause,
                }
            })
            .and_then(|artifact| {
                self.check_artifact(module, &artifact)?;
                Ok(artifact)
            });

        self.state.pop();
        let artifact = match outcome {
            Ok(artifact) => artifact,
            Err(err) => {
                self.stats.failures += 1;
                return Err(err);
            }
        };

        debug!("Module {} finished in {:?}", module.name(), started.elapsed());
        self.stats.executed += 1;
        let cached: &A = self
            .state
            .cache
            .entry(module.name().to_string())
            .or_insert(artifact);
        Ok(cached)
    }

    /// Run the module's quality checks against a fresh artifact
    fn check_artifact(&self, module: &Module<A>, artifact: &A) -> Result<(), ModuleError> {
        for check in module.checks() {
            let report = check.inspect(artifact).map_err(|cause| ModuleError::RunFailure {
                name: module.name().to_string(),
                path: self.state.in_progress.clone(),
                cause: cause.context(format!("check {} could not run", check.name())),
            })?;

            if check.policy().rejects(&report) {
                warn!(
                    "Module {} rejected by check {}: {} of {} items failed under {}",
                    module.name(),
                    check.name(),
                    report.failed,
                    report.checked,
                    check.policy()
                );
                return Err(ModuleError::CheckFailed {
                    name: module.name().to_string(),
                    check: check.name().to_string(),
                    path: self.state.in_progress.clone(),
                    report,
                    policy: check.policy(),
                });
            }
            if report.failed > 0 {
                warn!(
                    "Module {} check {}: {} of {} items failed, tolerated under {}",
                    module.name(),
                    check.name(),
                    report.failed,
                    report.checked,
                    check.policy()
                );
            }
        }
        Ok(())
    }
}

/// Clears the in-progress stack when a resolve call ends, unwinding included
struct InProgressGuard<'r, A> {
    resolver: &'r mut DependencyResolver<A>,
}

impl<A> Drop for InProgressGuard<'_, A> {
    fn drop(&mut self) {
        self.resolver.state.clear_in_progress();
    }
}

impl<A> DependencyResolver<A> {
    /// Cached artifact for `name`, if it has been resolved
    pub fn cached(&self, name: &str) -> Option<&A> {
        self.state.cache.get(name)
    }

    pub fn is_resolved(&self, name: &str) -> bool {
        self.state.cache.contains_key(name)
    }

    /// Names of all resolved modules, sorted
    pub fn resolved_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.state.cache.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// True when no resolution is in progress
    pub fn is_idle(&self) -> bool {
        self.state.in_progress.is_empty()
    }

    pub fn stats(&self) -> ResolutionStats {
        self.stats
    }

    pub fn catalog(&self) -> &Arc<ModuleCatalog<A>> {
        &self.catalog
    }
}
