//! Annotation-driven configuration on cluster resources.

use kube::{Resource, ResourceExt};

use crate::catalog::LABEL_PREFIX;
use crate::error::DiscoveryError;

/// Test groups for a pod.
pub const POD_TESTS_ANNOTATION: &str = "host_resource_tests";
/// Test groups for an operator's CSV.
pub const OPERATOR_TESTS_ANNOTATION: &str = "operator_tests";
/// Subscription that installed an operator.
pub const SUBSCRIPTION_NAME_ANNOTATION: &str = "subscription_name";

/// Fully qualified annotation key: `<LABEL_PREFIX>/<name>`.
pub fn annotation_name(name: &str) -> String {
    format!("{LABEL_PREFIX}/{name}")
}

/// Read annotation `key` as a JSON list of strings.
///
/// Fails with `AnnotationMissing` when unset and `AnnotationMalformed` when the
/// value isn't valid JSON or isn't a list of strings.
pub fn resolve_annotation<K>(resource: &K, key: &str) -> Result<Vec<String>, DiscoveryError>
where
    K: Resource,
{
    let raw = resource
        .annotations()
        .get(key)
        .ok_or_else(|| DiscoveryError::annotation_missing(key))?;
    serde_json::from_str::<Vec<String>>(raw).map_err(|e| DiscoveryError::annotation_malformed(key, e))
}
