//! Module system traits and core types
//!
//! Defines the module value object, the computation trait modules carry,
//! the input mapping handed to a computation, and the module error taxonomy.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::module::quality::{ArtifactCheck, CheckReport, FailurePolicy};

/// Computation a module runs once its dependencies are resolved
///
/// Implemented for any `Fn(&ModuleInputs<A>) -> anyhow::Result<A>`, so most
/// modules are declared with a closure. Implement the trait directly when the
/// computation owns configuration or handles to an external engine.
pub trait Computation<A>: Send + Sync {
    /// Produce this module's artifact from the artifacts of its dependencies
    fn run(&self, inputs: &ModuleInputs<A>) -> anyhow::Result<A>;
}

impl<A, F> Computation<A> for F
where
    F: Fn(&ModuleInputs<A>) -> anyhow::Result<A> + Send + Sync,
{
    fn run(&self, inputs: &ModuleInputs<A>) -> anyhow::Result<A> {
        self(inputs)
    }
}

/// A named unit of computation with declared dependencies
///
/// Modules are plain values: build one with [`Module::new`], attach
/// dependencies with [`Module::depends_on`], and register it into a
/// [`ModuleCatalog`](crate::module::registry::ModuleCatalog).
pub struct Module<A> {
    name: String,
    description: String,
    dependencies: Vec<String>,
    computation: Arc<dyn Computation<A>>,
    checks: Vec<ArtifactCheck<A>>,
}

impl<A> Module<A> {
    /// Create a module with no dependencies from a closure
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&ModuleInputs<A>) -> anyhow::Result<A> + Send + Sync + 'static,
    {
        Self::from_shared(name, Arc::new(run))
    }

    /// Create a module from a [`Computation`] implementation
    pub fn with_computation<C>(name: impl Into<String>, computation: C) -> Self
    where
        C: Computation<A> + 'static,
    {
        Self::from_shared(name, Arc::new(computation))
    }

    /// Create a module from an already shared computation
    pub fn from_shared(name: impl Into<String>, computation: Arc<dyn Computation<A>>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            dependencies: Vec::new(),
            computation,
            checks: Vec::new(),
        }
    }

    /// Set the human-readable description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append dependency names, keeping declaration order
    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    /// Attach a quality check run against every artifact this module produces
    pub fn with_check(mut self, check: ArtifactCheck<A>) -> Self {
        self.checks.push(check);
        self
    }

    /// Module name (unique within a catalog)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Dependency names exactly as declared, duplicates included
    pub fn declared_dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Distinct dependency names in first-declared order
    pub fn dependencies(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.dependencies
            .iter()
            .map(String::as_str)
            .filter(|dep| seen.insert(*dep))
            .collect()
    }

    /// Run the computation against resolved inputs
    pub fn run(&self, inputs: &ModuleInputs<A>) -> anyhow::Result<A> {
        self.computation.run(inputs)
    }

    /// Quality checks in attachment order
    pub fn checks(&self) -> &[ArtifactCheck<A>] {
        &self.checks
    }

    /// Serializable description of this module
    pub fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata {
            name: self.name.clone(),
            description: self.description.clone(),
            dependencies: self.dependencies().into_iter().map(String::from).collect(),
        }
    }
}

impl<A> Clone for Module<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            dependencies: self.dependencies.clone(),
            computation: Arc::clone(&self.computation),
            checks: self.checks.clone(),
        }
    }
}

impl<A> fmt::Debug for Module<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("dependencies", &self.dependencies)
            .field("checks", &self.checks)
            .finish_non_exhaustive()
    }
}

/// Module metadata describing module identity and dependencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    /// Module name (unique identifier)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Distinct dependency names in declaration order
    pub dependencies: Vec<String>,
}

/// Resolved dependency artifacts handed to a module's computation
#[derive(Debug, Clone)]
pub struct ModuleInputs<A> {
    order: Vec<String>,
    artifacts: HashMap<String, A>,
}

impl<A> ModuleInputs<A> {
    /// Create an empty input mapping
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            artifacts: HashMap::new(),
        }
    }

    /// Add an input; a repeated name keeps its first position and value
    pub fn insert(&mut self, name: impl Into<String>, artifact: A) {
        let name = name.into();
        if self.artifacts.contains_key(&name) {
            return;
        }
        self.order.push(name.clone());
        self.artifacts.insert(name, artifact);
    }

    /// Artifact of the named dependency, if it is an input
    pub fn get(&self, name: &str) -> Option<&A> {
        self.artifacts.get(name)
    }

    /// Artifact of the named dependency, or an error usable with `?`
    pub fn require(&self, name: &str) -> anyhow::Result<&A> {
        self.artifacts
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("input {} is not a declared dependency", name))
    }

    /// Input names in dependency declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Inputs in dependency declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &A)> {
        self.order
            .iter()
            .filter_map(|name| self.artifacts.get(name).map(|a| (name.as_str(), a)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<A> Default for ModuleInputs<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Module system errors
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("Module already registered: {0}")]
    DuplicateName(String),

    #[error("Module not found: {0}")]
    NotFound(String),

    #[error("Cyclic dependency detected: {}", path.join(" -> "))]
    CyclicDependency { path: Vec<String> },

    #[error("Module {name} failed (resolution path: {}): {cause:#}", path.join(" -> "))]
    RunFailure {
        name: String,
        path: Vec<String>,
        #[source]
        cause: anyhow::Error,
    },

    #[error(
        "Module {name} rejected by check {check} (resolution path: {}): {} of {} items failed under {policy}",
        path.join(" -> "), report.failed, report.checked
    )]
    CheckFailed {
        name: String,
        check: String,
        path: Vec<String>,
        report: CheckReport,
        policy: FailurePolicy,
    },

    #[error("Invalid module manifest: {0}")]
    InvalidManifest(String),

    #[error("No computation bound for singleton {name} in namespace {namespace}")]
    UnboundComputation { namespace: String, name: String },

    #[error("Malformed graph edge list at line {line}: {reason}")]
    GraphFormat { line: usize, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ModuleError {
    /// Name of the module this error is about, when there is one
    pub fn module_name(&self) -> Option<&str> {
        match self {
            ModuleError::DuplicateName(name) | ModuleError::NotFound(name) => Some(name),
            ModuleError::RunFailure { name, .. } | ModuleError::CheckFailed { name, .. } => {
                Some(name)
            }
            ModuleError::UnboundComputation { name, .. } => Some(name),
            ModuleError::CyclicDependency { path } => path.first().map(String::as_str),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ModuleError {
    fn from(e: serde_json::Error) -> Self {
        ModuleError::SerializationError(e.to_string())
    }
}
