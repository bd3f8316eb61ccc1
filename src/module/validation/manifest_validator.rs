//! Manifest validation framework
//!
//! Validates namespace manifests and names before they reach a catalog.

use std::collections::HashSet;
use tracing::{debug, warn};

use crate::module::registry::manifest::{DeclarationKind, NamespaceManifest};

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Manifest is valid
    Valid,
    /// Manifest is invalid with specific errors
    Invalid(Vec<String>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Manifest validator
pub struct ManifestValidator {
    /// Maximum length of a module or namespace name
    max_name_len: usize,
}

impl ManifestValidator {
    /// Create a new manifest validator
    pub fn new() -> Self {
        Self { max_name_len: 128 }
    }

    /// Validate a namespace manifest
    pub fn validate(&self, namespace: &str, manifest: &NamespaceManifest) -> ValidationResult {
        let mut errors = Vec::new();
        let mut singleton_names = HashSet::new();

        for declaration in &manifest.declarations {
            if !self.is_valid_name(&declaration.name) {
                errors.push(format!(
                    "Invalid declaration name: {:?} (must start alphanumeric and use only alphanumerics, '-', '_' or '.')",
                    declaration.name
                ));
            }

            if declaration.kind != DeclarationKind::Singleton {
                continue;
            }

            if !singleton_names.insert(declaration.name.as_str()) {
                errors.push(format!(
                    "Singleton {} declared more than once",
                    declaration.name
                ));
            }

            if let Err(dep_errors) =
                self.validate_dependencies(&declaration.name, &declaration.dependencies)
            {
                errors.extend(dep_errors);
            }
        }

        if errors.is_empty() {
            debug!("Manifest validation passed for namespace: {}", namespace);
            ValidationResult::Valid
        } else {
            warn!(
                "Manifest validation failed for namespace {}: {:?}",
                namespace, errors
            );
            ValidationResult::Invalid(errors)
        }
    }

    /// Validate a module or namespace name
    ///
    /// Dots are allowed so namespaces can be hierarchical (`stage1.inputs`).
    #[inline]
    pub fn is_valid_name(&self, name: &str) -> bool {
        if name.is_empty() || name.len() > self.max_name_len {
            return false;
        }

        if !name.chars().next().map_or(false, |c| c.is_alphanumeric()) {
            return false;
        }

        name.chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    }

    /// Validate a singleton's dependency list
    fn validate_dependencies(
        &self,
        module: &str,
        dependencies: &[String],
    ) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for dep_name in dependencies {
            if !self.is_valid_name(dep_name) {
                errors.push(format!(
                    "Invalid dependency name {:?} (for module: {})",
                    dep_name, module
                ));
            }
            if dep_name == module {
                errors.push(format!("Module {} depends on itself", module));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for ManifestValidator {
    fn default() -> Self {
        Self::new()
    }
}
