//! Resolver shared between threads
//!
//! The whole resolve call tree runs inside one critical section, so
//! concurrent callers cannot populate the cache twice or observe each
//! other's in-progress stack as a cycle.

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use crate::module::registry::ModuleCatalog;
use crate::module::resolver::{DependencyResolver, ResolutionStats};
use crate::module::traits::ModuleError;

/// A [`DependencyResolver`] serialized behind a single mutex
pub struct SharedResolver<A> {
    inner: Mutex<DependencyResolver<A>>,
}

impl<A: Clone> SharedResolver<A> {
    pub fn new(catalog: Arc<ModuleCatalog<A>>) -> Self {
        Self::from_resolver(DependencyResolver::new(catalog))
    }

    pub fn from_resolver(resolver: DependencyResolver<A>) -> Self {
        Self {
            inner: Mutex::new(resolver),
        }
    }

    /// Resolve `name`, waiting for any resolution already in progress
    pub fn resolve(&self, name: &str) -> Result<A, ModuleError> {
        self.lock().resolve(name)
    }

    /// Run `f` with exclusive access to the resolver
    pub fn with_resolver<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut DependencyResolver<A>) -> R,
    {
        let mut guard = self.lock();
        f(&mut guard)
    }

    pub fn stats(&self) -> ResolutionStats {
        self.lock().stats()
    }

    /// Consume the wrapper and return the resolver with its cache
    pub fn into_inner(self) -> DependencyResolver<A> {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Acquire the lock, recovering from a computation that panicked
    ///
    /// Cache entries are only written after a successful run and the
    /// in-progress stack is cleared on unwind, so the resolver stays usable.
    fn lock(&self) -> MutexGuard<'_, DependencyResolver<A>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Resolver lock poisoned by a panicking module, recovering");
                self.inner.clear_poison();
                poisoned.into_inner()
            }
        }
    }
}
