//! Module validation
//!
//! Provides manifest validation and name checks for discovered modules.

pub mod manifest_validator;

pub use manifest_validator::{ManifestValidator, ValidationResult};
