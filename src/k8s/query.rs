use async_trait::async_trait;
use k8s_openapi::api::{apps::v1::Deployment, core::v1::Pod};
use kube::{
    api::{Api, DynamicObject, GroupVersionKind, ListParams},
    discovery::ApiResource,
    Client, Resource,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::catalog::Label;
use crate::error::DiscoveryError;

/// Read-only label queries against the cluster.
///
/// An empty or blank `namespace` means all namespaces. Implementations do not retry.
#[async_trait]
pub trait ResourceQuery: Send + Sync {
    async fn pods(&self, label: &Label, namespace: &str) -> Result<Vec<Pod>, DiscoveryError>;

    async fn deployments(
        &self,
        label: &Label,
        namespace: &str,
    ) -> Result<Vec<Deployment>, DiscoveryError>;

    async fn cluster_service_versions(
        &self,
        label: &Label,
        namespace: &str,
    ) -> Result<Vec<DynamicObject>, DiscoveryError>;
}

/// `operators.coreos.com/v1alpha1` ClusterServiceVersion.
pub fn csv_api_resource() -> ApiResource {
    ApiResource::from_gvk(&GroupVersionKind::gvk(
        "operators.coreos.com",
        "v1alpha1",
        "ClusterServiceVersion",
    ))
}

/// [`ResourceQuery`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeResourceQuery {
    client: Client,
}

impl KubeResourceQuery {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn is_cluster_wide(namespace: &str) -> bool {
        namespace.trim().is_empty()
    }
}

#[async_trait]
impl ResourceQuery for KubeResourceQuery {
    async fn pods(&self, label: &Label, namespace: &str) -> Result<Vec<Pod>, DiscoveryError> {
        let api: Api<Pod> = if Self::is_cluster_wide(namespace) {
            Api::all(self.client.clone())
        } else {
            Api::namespaced(self.client.clone(), namespace)
        };
        list_typed(api, "pods", label).await
    }

    async fn deployments(
        &self,
        label: &Label,
        namespace: &str,
    ) -> Result<Vec<Deployment>, DiscoveryError> {
        let api: Api<Deployment> = if Self::is_cluster_wide(namespace) {
            Api::all(self.client.clone())
        } else {
            Api::namespaced(self.client.clone(), namespace)
        };
        list_typed(api, "deployments", label).await
    }

    async fn cluster_service_versions(
        &self,
        label: &Label,
        namespace: &str,
    ) -> Result<Vec<DynamicObject>, DiscoveryError> {
        let ar = csv_api_resource();
        let api: Api<DynamicObject> = if Self::is_cluster_wide(namespace) {
            Api::all_with(self.client.clone(), &ar)
        } else {
            Api::namespaced_with(self.client.clone(), namespace, &ar)
        };
        list_typed(api, "clusterserviceversions", label).await
    }
}

/// List every `T` matching `label`, mapping API errors to [`DiscoveryError::Query`].
async fn list_typed<T>(
    api: Api<T>,
    resource: &'static str,
    label: &Label,
) -> Result<Vec<T>, DiscoveryError>
where
    T: Resource + DeserializeOwned + Clone + std::fmt::Debug,
{
    let selector = label.selector();
    debug!(resource, selector = %selector, "listing by label");
    let list = api
        .list(&ListParams::default().labels(&selector))
        .await
        .map_err(|e| DiscoveryError::query(resource, &selector, e))?;
    Ok(list.items)
}
