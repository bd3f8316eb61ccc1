//! modgraph - memoized dependency resolution over a catalog of named modules
//!
//! An application registers its modules (named computations that declare the
//! names of the modules they need) into a [`ModuleCatalog`]. A
//! [`DependencyResolver`] then turns a module name into that module's
//! artifact:
//!
//! - every module's computation runs at most once for the resolver's lifetime,
//!   however many other modules depend on it
//! - dependencies are resolved depth-first in declaration order
//! - cycles are reported as [`ModuleError::CyclicDependency`] with the cycle path
//! - a failed computation is reported as [`ModuleError::RunFailure`] and never cached
//! - an artifact rejected by one of its module's [`ArtifactCheck`]s is reported as
//!   [`ModuleError::CheckFailed`] and never cached
//!
//! A [`GraphBuilder`] derives the read-only [`DependencyGraph`] of a module
//! without running anything, for diagnostics and export.
//!
//! ## Design Principles
//!
//! 1. **Opaque artifacts**: the engine never inspects what a module produces
//! 2. **Explicit registration**: no ambient singletons; several catalogs can coexist
//! 3. **Pluggable discovery**: namespaces are scanned through [`ModuleDiscovery`]
//!
//! ```
//! use std::sync::Arc;
//! use modgraph::{DependencyResolver, Module, ModuleCatalog, ModuleInputs};
//!
//! let catalog = ModuleCatalog::from_modules(vec![
//!     Module::new("a", |_| Ok(1)),
//!     Module::new("b", |inputs: &ModuleInputs<i32>| Ok(inputs.require("a")? * 10))
//!         .depends_on(["a"]),
//! ])?;
//! let mut resolver = DependencyResolver::new(Arc::new(catalog));
//! assert_eq!(resolver.resolve("b")?, 10);
//! # Ok::<(), modgraph::ModuleError>(())
//! ```

pub mod config;
pub mod module;
pub mod utils;

pub use config::ResolverConfig;
pub use module::{
    ArtifactCheck, CheckReport, Computation, DependencyGraph, DependencyResolver, FailurePolicy,
    GraphBuilder, GraphExportFormat, Module, ModuleCatalog, ModuleDiscovery, ModuleError,
    ModuleInputs, ModuleMetadata, ResolutionStats, SharedResolver,
};
