//! Turn raw cluster resources into catalog entities.

use k8s_openapi::api::{apps::v1::Deployment as DeploymentResource, core::v1::Pod as PodResource};
use kube::{api::DynamicObject, ResourceExt};
use serde::Deserialize;
use tracing::{debug, warn};

use super::annotations::{
    annotation_name, resolve_annotation, OPERATOR_TESTS_ANNOTATION, POD_TESTS_ANNOTATION,
    SUBSCRIPTION_NAME_ANNOTATION,
};
use crate::catalog::{ContainerConfig, ContainerIdentifier, Deployment, Operator, Pod};
use crate::diagnostics::{Diagnostics, Step};
use crate::error::DiscoveryError;
use crate::testcases::{configured_operator_tests, configured_pod_tests, TestCatalogProvider};

/// Multus network attachment status written by the CNI plugin.
pub const NETWORKS_STATUS_ANNOTATION: &str = "k8s.v1.cni.cncf.io/networks-status";

/// Interface assumed when the pod reports no default network.
pub const DEFAULT_NETWORK_DEVICE: &str = "eth0";

/// Kubernetes defaults an unset replica count to one.
const DEFAULT_REPLICAS: i32 = 1;

pub fn build_pod(
    resource: &PodResource,
    test_catalog: &dyn TestCatalogProvider,
    diagnostics: &mut Diagnostics,
) -> Pod {
    let spec = resource.spec.as_ref();
    let mut pod = Pod {
        namespace: resource.namespace().unwrap_or_default(),
        name: resource.name_any(),
        service_account: spec
            .and_then(|s| s.service_account_name.clone().or_else(|| s.service_account.clone()))
            .unwrap_or_default(),
        container_count: spec.map(|s| s.containers.len()).unwrap_or(0),
        tests: Vec::new(),
    };

    // An empty test list is treated as malformed.
    let key = annotation_name(POD_TESTS_ANNOTATION);
    let annotated = resolve_annotation(resource, &key).and_then(|tests| {
        if tests.is_empty() {
            Err(DiscoveryError::annotation_malformed(&key, "empty test list"))
        } else {
            Ok(tests)
        }
    });
    pod.tests = match annotated {
        Ok(tests) => tests,
        Err(e) => {
            warn!(
                namespace = %pod.namespace,
                pod = %pod.name,
                error = %e,
                "unable to extract tests from annotation, falling back to all pod tests"
            );
            diagnostics.record(Step::PodTests, subject(&pod.namespace, &pod.name), e);
            configured_pod_tests(test_catalog, diagnostics)
        }
    };
    pod
}

pub fn build_operator(
    csv: &DynamicObject,
    test_catalog: &dyn TestCatalogProvider,
    diagnostics: &mut Diagnostics,
) -> Operator {
    let mut op = Operator {
        name: csv.name_any(),
        namespace: csv.namespace().unwrap_or_default(),
        ..Default::default()
    };

    let key = annotation_name(OPERATOR_TESTS_ANNOTATION);
    op.tests = match resolve_annotation(csv, &key) {
        Ok(tests) => tests,
        Err(e) => {
            warn!(
                namespace = %op.namespace,
                operator = %op.name,
                error = %e,
                "unable to extract tests from annotation, falling back to all operator tests"
            );
            diagnostics.record(Step::OperatorTests, subject(&op.namespace, &op.name), e);
            configured_operator_tests(test_catalog, diagnostics)
        }
    };

    // Some operators are installed without a subscription; that is not a failure.
    let key = annotation_name(SUBSCRIPTION_NAME_ANNOTATION);
    match resolve_annotation(csv, &key) {
        Ok(names) => match names.into_iter().next() {
            Some(name) => op.subscription_name = name,
            None => warn!(
                namespace = %op.namespace,
                operator = %op.name,
                "subscription name annotation is an empty list"
            ),
        },
        Err(e) => {
            warn!(
                namespace = %op.namespace,
                operator = %op.name,
                error = %e,
                "unable to get a subscription name annotation from CSV"
            );
            diagnostics.record(Step::SubscriptionName, subject(&op.namespace, &op.name), e);
        }
    }
    op
}

pub fn build_deployment(resource: &DeploymentResource) -> Deployment {
    Deployment {
        name: resource.name_any(),
        namespace: resource.namespace().unwrap_or_default(),
        replicas: resource
            .spec
            .as_ref()
            .and_then(|s| s.replicas)
            .unwrap_or(DEFAULT_REPLICAS),
    }
}

/// One identifier per container in the pod spec, in spec order.
pub fn build_container_identifiers(resource: &PodResource) -> Vec<ContainerIdentifier> {
    let namespace = resource.namespace().unwrap_or_default();
    let pod_name = resource.name_any();
    let Some(spec) = resource.spec.as_ref() else {
        return Vec::new();
    };
    let node_name = spec.node_name.clone().unwrap_or_default();

    spec.containers
        .iter()
        .map(|c| ContainerIdentifier {
            namespace: namespace.clone(),
            pod_name: pod_name.clone(),
            container_name: c.name.clone(),
            node_name: node_name.clone(),
            container_uid: container_uid(resource, &c.name),
        })
        .collect()
}

/// One config entry per container in the pod spec, sharing the pod's network view.
pub fn build_containers(resource: &PodResource) -> Vec<ContainerConfig> {
    let (default_network_device, multus_ip_addresses) = network_view(resource);
    build_container_identifiers(resource)
        .into_iter()
        .map(|identifier| ContainerConfig {
            identifier,
            default_network_device: default_network_device.clone(),
            multus_ip_addresses: multus_ip_addresses.clone(),
        })
        .collect()
}

/// Runtime container id without its `<runtime>://` scheme; empty until reported.
fn container_uid(resource: &PodResource, container: &str) -> String {
    resource
        .status
        .as_ref()
        .and_then(|s| s.container_statuses.as_ref())
        .and_then(|statuses| statuses.iter().find(|cs| cs.name == container))
        .and_then(|cs| cs.container_id.as_deref())
        .map(|id| match id.split_once("://") {
            Some((_, uid)) => uid.to_string(),
            None => id.to_string(),
        })
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct NetworkStatus {
    #[serde(default)]
    interface: String,
    #[serde(default)]
    ips: Vec<String>,
    #[serde(default)]
    default: bool,
}

/// Default interface and secondary (multus) addresses from the networks-status annotation.
fn network_view(resource: &PodResource) -> (String, Vec<String>) {
    let fallback = || (DEFAULT_NETWORK_DEVICE.to_string(), Vec::new());
    let Some(raw) = resource.annotations().get(NETWORKS_STATUS_ANNOTATION) else {
        return fallback();
    };
    let statuses: Vec<NetworkStatus> = match serde_json::from_str(raw) {
        Ok(s) => s,
        Err(e) => {
            debug!(pod = %resource.name_any(), error = %e, "ignoring unparsable networks-status annotation");
            return fallback();
        }
    };

    let device = statuses
        .iter()
        .find(|s| s.default && !s.interface.is_empty())
        .map(|s| s.interface.clone())
        .unwrap_or_else(|| DEFAULT_NETWORK_DEVICE.to_string());
    let multus = statuses
        .iter()
        .filter(|s| !s.default)
        .flat_map(|s| s.ips.iter().cloned())
        .collect();
    (device, multus)
}

pub(crate) fn subject(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}/{name}")
    }
}
