//! Tests for targetscout::diagnostics and targetscout::error — failure records and messages.

use std::time::Duration;

use targetscout::diagnostics::{Diagnostics, Step};
use targetscout::error::DiscoveryError;

#[test]
fn records_keep_order_and_filter_by_step() {
    let mut diags = Diagnostics::new();
    diags.record(Step::PodQuery, "app=web", DiscoveryError::query("pods", "app=web", "refused"));
    diags.record(Step::NodeQuery, "master", DiscoveryError::Decode("eof".into()));
    diags.record(Step::PodQuery, "app=db", DiscoveryError::query("pods", "app=db", "refused"));

    assert_eq!(diags.len(), 3);
    let subjects: Vec<_> = diags.for_step(Step::PodQuery).iter().map(|d| d.subject.as_str()).collect();
    assert_eq!(subjects, ["app=web", "app=db"]);
    assert!(diags.has_step(Step::NodeQuery));
    assert!(!diags.has_step(Step::CrdQuery));
}

#[test]
fn extend_appends() {
    let mut a = Diagnostics::new();
    a.record(Step::CrdQuery, "crd", DiscoveryError::Decode("x".into()));
    let mut b = Diagnostics::new();
    b.record(Step::TestCatalog, "tests.toml", DiscoveryError::Decode("y".into()));
    a.extend(b);
    let steps: Vec<Step> = a.into_iter().map(|d| d.step).collect();
    assert_eq!(steps, [Step::CrdQuery, Step::TestCatalog]);
}

#[test]
fn serializes_error_as_message() {
    let mut diags = Diagnostics::new();
    diags.record(
        Step::PodTests,
        "cnf/web-0",
        DiscoveryError::annotation_missing("test-network-function.com/host_resource_tests"),
    );
    let json = serde_json::to_value(&diags).unwrap();
    assert_eq!(json[0]["step"], "pod_tests");
    assert_eq!(json[0]["subject"], "cnf/web-0");
    assert_eq!(
        json[0]["error"],
        "annotation 'test-network-function.com/host_resource_tests' is not set"
    );
}

#[test]
fn error_messages_carry_context() {
    let err = DiscoveryError::query("deployments", "app=web", "connection refused");
    assert_eq!(
        err.to_string(),
        "failed to list deployments with selector 'app=web': connection refused"
    );

    let err = DiscoveryError::Timeout {
        command: "kubectl get crd".into(),
        timeout: Duration::from_secs(10),
    };
    assert!(err.to_string().contains("timed out after 10s"));
}

#[test]
fn only_annotation_variants_are_annotation_errors() {
    assert!(DiscoveryError::annotation_malformed("k", "bad").is_annotation_error());
    assert!(!DiscoveryError::Decode("bad".into()).is_annotation_error());
}
