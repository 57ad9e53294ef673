//! CRD names filtered by configured name suffixes.

use tracing::{debug, error};

use super::CommandSettings;
use crate::catalog::CrdFilter;
use crate::diagnostics::{Diagnostics, Step};
use crate::error::DiscoveryError;
use crate::k8s::exec::{execute_command, CommandExecutor};

/// Command printing every CRD name in the cluster as a JSON array.
pub fn crd_names_command(binary: &str) -> String {
    format!("{binary} get crd -o json | jq '[.items[].metadata.name]'")
}

/// CRD names that end with any filter's suffix, in cluster order, each at most once.
pub fn filter_crd_names(cluster_crd_names: &[String], filters: &[CrdFilter]) -> Vec<String> {
    cluster_crd_names
        .iter()
        .filter(|name| filters.iter().any(|f| f.matches(name)))
        .cloned()
        .collect()
}

/// Every CRD name in the cluster.
pub async fn cluster_crd_names(
    executor: &dyn CommandExecutor,
    settings: &CommandSettings,
) -> Result<Vec<String>, DiscoveryError> {
    let command = crd_names_command(&settings.binary);
    let output = execute_command(executor, &command, settings.timeout, |e| {
        error!(command = %command, error = %e, "can't run command");
    })
    .await?;
    serde_json::from_str(&output).map_err(|e| DiscoveryError::Decode(e.to_string()))
}

/// CRD names matching the configured filters; empty when the listing fails.
pub async fn find_crd_names(
    executor: &dyn CommandExecutor,
    settings: &CommandSettings,
    filters: &[CrdFilter],
    diagnostics: &mut Diagnostics,
) -> Vec<String> {
    let names = match cluster_crd_names(executor, settings).await {
        Ok(names) => names,
        Err(e) => {
            error!(error = %e, "unable to get cluster CRDs");
            diagnostics.record(Step::CrdQuery, "crd", e);
            return Vec::new();
        }
    };
    let targets = filter_crd_names(&names, filters);
    debug!(total = names.len(), matched = targets.len(), "filtered cluster CRDs");
    targets
}
