//! Discovery configuration, read from a TOML file.
//!
//! Looked up at `$TARGETSCOUT_CONFIG`, else `<config dir>/targetscout/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::{CrdFilter, Label};
use crate::discover::CommandSettings;
use crate::k8s::exec::DEFAULT_TIMEOUT;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "TARGETSCOUT_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Namespace to search; empty searches all namespaces.
    pub namespace: String,
    /// Kubeconfig context; the current one when unset.
    pub context: Option<String>,
    /// Kubeconfig path; the default location when unset.
    pub kubeconfig: Option<String>,
    /// Cluster CLI used for node and CRD listings.
    pub client_binary: String,
    pub command_timeout_secs: u64,
    /// Test-definition file supplying fallback test groups.
    pub test_catalog: Option<PathBuf>,
    /// Collapse pods/deployments that several labels matched.
    pub dedup_targets: bool,
    pub target_labels: Vec<Label>,
    pub crd_filters: Vec<CrdFilter>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            context: None,
            kubeconfig: None,
            client_binary: "kubectl".to_string(),
            command_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            test_catalog: None,
            dedup_targets: false,
            target_labels: Vec::new(),
            crd_filters: Vec::new(),
        }
    }
}

impl DiscoveryConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse discovery config")
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load from the resolved path, or defaults when no file exists there.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// `$TARGETSCOUT_CONFIG` if set, else the per-user config file.
    pub fn config_path() -> Option<PathBuf> {
        std::env::var_os(CONFIG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|d| d.join("targetscout").join("config.toml")))
    }

    pub fn command_settings(&self) -> CommandSettings {
        CommandSettings {
            binary: self.client_binary.clone(),
            timeout: Duration::from_secs(self.command_timeout_secs),
        }
    }
}
