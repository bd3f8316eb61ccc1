//! Module system
//!
//! A module is a named computation that declares which other modules it
//! needs. This module provides:
//!
//! - **Catalog**: explicit registry of modules, filled once at startup
//! - **Discovery**: pluggable lookup of the singleton modules in a namespace
//! - **Resolution**: memoized, cycle-checked execution of a module and its dependencies
//! - **Graphs**: read-only dependency graphs for diagnostics and export
//! - **Quality checks**: post-run artifact checks with failure thresholds

pub mod traits;
pub mod registry;
pub mod resolver;
pub mod graph;
pub mod quality;
pub mod validation;

pub use traits::{Computation, Module, ModuleError, ModuleInputs, ModuleMetadata};
pub use registry::{ModuleCatalog, ModuleDiscovery};
pub use resolver::{DependencyResolver, ResolutionStats, SharedResolver};
pub use graph::{DependencyGraph, GraphBuilder, GraphExportFormat};
pub use quality::{ArtifactCheck, CheckReport, FailurePolicy};
