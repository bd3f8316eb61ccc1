//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use modgraph::{Module, ModuleCatalog, ModuleInputs};

/// Builds catalogs of string-producing modules and counts how often each runs
///
/// Each module's artifact is `name(input1,input2,...)`, so an artifact shows
/// exactly which inputs it was computed from.
#[derive(Default)]
pub struct CountingFixture {
    runs: Arc<Mutex<HashMap<String, usize>>>,
    total: Arc<AtomicUsize>,
}

impl CountingFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Module that records each run
    pub fn module(&self, name: &str, deps: &[&str]) -> Module<String> {
        let runs = Arc::clone(&self.runs);
        let total = Arc::clone(&self.total);
        let own_name = name.to_string();
        Module::new(name, move |inputs: &ModuleInputs<String>| {
            *runs.lock().unwrap().entry(own_name.clone()).or_insert(0) += 1;
            total.fetch_add(1, Ordering::SeqCst);
            let parts: Vec<&str> = inputs.iter().map(|(_, a)| a.as_str()).collect();
            Ok(format!("{}({})", own_name, parts.join(",")))
        })
        .with_description(format!("test module {}", name))
        .depends_on(deps.iter().copied())
    }

    /// Catalog from `(name, deps)` pairs, in order
    pub fn catalog(&self, layout: &[(&str, &[&str])]) -> Arc<ModuleCatalog<String>> {
        let modules = layout.iter().map(|(name, deps)| self.module(name, deps));
        Arc::new(ModuleCatalog::from_modules(modules).expect("test catalog has unique names"))
    }

    /// Times `name` has run
    pub fn runs(&self, name: &str) -> usize {
        self.runs.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    /// Total runs across all modules
    pub fn total_runs(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}
