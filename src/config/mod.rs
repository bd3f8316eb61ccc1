//! Configuration management for modgraph
//!
//! Handles configuration loading and validation for logging, namespace
//! discovery and graph export.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::module::graph::GraphExportFormat;
use crate::utils::env_opt;

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "MODGRAPH_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Logging configuration
    pub logging: Option<LoggingConfig>,

    /// Namespace discovery configuration
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Graph export configuration
    #[serde(default)]
    pub graph: GraphExportConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (e.g., "info", "modgraph=debug"); RUST_LOG takes precedence
    pub filter: Option<String>,

    /// Emit JSON lines instead of human-readable output
    #[serde(default = "default_false")]
    pub json_format: bool,
}

/// Namespace discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Directory containing `<namespace>.toml` manifests
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: PathBuf,

    /// Namespaces to register at startup, in order
    #[serde(default)]
    pub namespaces: Vec<String>,
}

fn default_false() -> bool {
    false
}

fn default_manifest_dir() -> PathBuf {
    PathBuf::from("modules")
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            manifest_dir: default_manifest_dir(),
            namespaces: Vec::new(),
        }
    }
}

/// Graph export configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphExportConfig {
    /// Format used when rendering dependency graphs
    #[serde(default)]
    pub format: GraphExportFormat,
}

impl ResolverConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: ResolverConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `MODGRAPH_CONFIG`, or use defaults when unset
    pub fn from_env() -> anyhow::Result<Self> {
        match env_opt(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.discovery.namespaces.is_empty()
            && self.discovery.manifest_dir.as_os_str().is_empty()
        {
            return Err(anyhow::anyhow!(
                "discovery.manifest_dir must be set when namespaces are listed"
            ));
        }

        if let Some(empty) = self.discovery.namespaces.iter().find(|ns| ns.trim().is_empty()) {
            return Err(anyhow::anyhow!(
                "discovery.namespaces contains an empty namespace ({:?})",
                empty
            ));
        }

        Ok(())
    }
}
