//! Tests for targetscout::k8s::client and targetscout::k8s::query — kubeconfig handling and CSV resource.

use targetscout::k8s::client::{build_client, current_context};
use targetscout::k8s::query::csv_api_resource;

// ── current_context ───────────────────────────────────────────────────────────

#[test]
fn current_context_returns_non_empty_string() {
    // Without a kubeconfig the function returns "unknown"; with one it returns the context name.
    let ctx = current_context();
    assert!(
        !ctx.is_empty(),
        "current_context must never return an empty string"
    );
}

// ── build_client — error paths ────────────────────────────────────────────────

#[tokio::test]
async fn build_client_invalid_kubeconfig_path_returns_error() {
    let result = build_client(Some("any-ctx"), Some("/nonexistent/kubeconfig.yaml")).await;
    assert!(
        result.is_err(),
        "build_client with nonexistent kubeconfig must return Err"
    );
}

#[tokio::test]
async fn build_client_nonexistent_context_returns_error() {
    let result = build_client(Some("targetscout-nonexistent-ctx-zzzz"), None).await;
    assert!(
        result.is_err(),
        "build_client with unknown context must return Err"
    );
}

// ── csv_api_resource ──────────────────────────────────────────────────────────

#[test]
fn csv_resource_targets_olm_group() {
    let ar = csv_api_resource();
    assert_eq!(ar.group, "operators.coreos.com");
    assert_eq!(ar.version, "v1alpha1");
    assert_eq!(ar.kind, "ClusterServiceVersion");
    assert_eq!(ar.plural, "clusterserviceversions");
    assert_eq!(ar.api_version, "operators.coreos.com/v1alpha1");
}
