//! Discovery of test targets from the current state of the cluster.
//!
//! [`Discovery::find_test_target`] drives every step against one catalog. Each
//! step is isolated: a failure is logged, recorded in the returned
//! [`Diagnostics`] and the run continues with whatever else succeeded.

pub mod annotations;
pub mod builders;
pub mod crds;
pub mod nodes;

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{info, warn};

use crate::catalog::{ContainerIdentifier, CrdFilter, Deployment, Label, Node, TestTarget};
use crate::diagnostics::{Diagnostics, Step};
use crate::k8s::exec::{CommandExecutor, DEFAULT_TIMEOUT};
use crate::k8s::query::ResourceQuery;
use crate::testcases::TestCatalogProvider;

/// Label marking operator CSVs.
pub const OPERATOR_LABEL_NAME: &str = "operator";
/// Label marking pods whose containers sit out connectivity tests.
pub const SKIP_CONNECTIVITY_TESTS_LABEL: &str = "skip_connectivity_tests";

/// How external commands are invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSettings {
    /// Cluster CLI, e.g. `kubectl` or `oc`.
    pub binary: String,
    pub timeout: Duration,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            binary: "kubectl".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// The collaborators one discovery run reads from.
pub struct Discovery<'a> {
    query: &'a dyn ResourceQuery,
    executor: &'a dyn CommandExecutor,
    test_catalog: &'a dyn TestCatalogProvider,
    settings: CommandSettings,
}

impl<'a> Discovery<'a> {
    pub fn new(
        query: &'a dyn ResourceQuery,
        executor: &'a dyn CommandExecutor,
        test_catalog: &'a dyn TestCatalogProvider,
    ) -> Self {
        Self {
            query,
            executor,
            test_catalog,
            settings: CommandSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: CommandSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &CommandSettings {
        &self.settings
    }

    /// Find test targets using labels and annotations and add them to `target`.
    ///
    /// Never fails: everything that went wrong is in the returned diagnostics.
    /// Resources matching several labels are added once per label.
    pub async fn find_test_target(
        &self,
        labels: &[Label],
        crd_filters: &[CrdFilter],
        namespace: &str,
        target: &mut TestTarget,
    ) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();

        self.add_pods(labels, namespace, target, &mut diagnostics)
            .await;
        target.exclude_containers_from_connectivity_tests = self
            .connectivity_exclusions(namespace, &mut diagnostics)
            .await;
        self.add_operators(namespace, target, &mut diagnostics)
            .await;
        let deployments = self
            .find_test_deployments(labels, namespace, &mut diagnostics)
            .await;
        target.deployments_under_test.extend(deployments);
        target.nodes = self.nodes(&mut diagnostics).await;
        if !crd_filters.is_empty() {
            target.crd_names = self.crd_names(crd_filters, &mut diagnostics).await;
        }

        info!(
            pods = target.pods_under_test.len(),
            containers = target.container_config_list.len(),
            operators = target.operators.len(),
            deployments = target.deployments_under_test.len(),
            nodes = target.nodes.len(),
            crds = target.crd_names.len(),
            failures = diagnostics.len(),
            "discovery finished"
        );
        diagnostics
    }

    async fn add_pods(
        &self,
        labels: &[Label],
        namespace: &str,
        target: &mut TestTarget,
        diagnostics: &mut Diagnostics,
    ) {
        for label in labels {
            match self.query.pods(label, namespace).await {
                Ok(pods) => {
                    for pod in &pods {
                        target.pods_under_test.push(builders::build_pod(
                            pod,
                            self.test_catalog,
                            diagnostics,
                        ));
                        target
                            .container_config_list
                            .extend(builders::build_containers(pod));
                    }
                }
                Err(e) => {
                    warn!(label = %label, error = %e, "failed to query pods by label");
                    diagnostics.record(Step::PodQuery, label.selector(), e);
                }
            }
        }
    }

    /// Containers to exclude from connectivity tests. The label is optional.
    async fn connectivity_exclusions(
        &self,
        namespace: &str,
        diagnostics: &mut Diagnostics,
    ) -> Vec<ContainerIdentifier> {
        let label = Label::any_value(SKIP_CONNECTIVITY_TESTS_LABEL);
        match self.query.pods(&label, namespace).await {
            Ok(pods) => pods
                .iter()
                .flat_map(builders::build_container_identifiers)
                .collect(),
            Err(e) => {
                warn!(error = %e, "failed to get the containers to exclude from connectivity tests, continuing");
                diagnostics.record(Step::ConnectivityExclusion, label.selector(), e);
                Vec::new()
            }
        }
    }

    async fn add_operators(
        &self,
        namespace: &str,
        target: &mut TestTarget,
        diagnostics: &mut Diagnostics,
    ) {
        let label = Label::any_value(OPERATOR_LABEL_NAME);
        match self.query.cluster_service_versions(&label, namespace).await {
            Ok(csvs) => {
                for csv in &csvs {
                    target.operators.push(builders::build_operator(
                        csv,
                        self.test_catalog,
                        diagnostics,
                    ));
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to look up operators by label");
                diagnostics.record(Step::OperatorQuery, label.selector(), e);
            }
        }
    }

    /// Deployments matching each label, independent of the pod step's outcome.
    pub async fn find_test_deployments(
        &self,
        labels: &[Label],
        namespace: &str,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Deployment> {
        let mut deployments = Vec::new();
        for label in labels {
            match self.query.deployments(label, namespace).await {
                Ok(found) => deployments.extend(found.iter().map(builders::build_deployment)),
                Err(e) => {
                    warn!(namespace, label = %label, error = %e, "unable to get deployment list");
                    diagnostics.record(Step::DeploymentQuery, label.selector(), e);
                }
            }
        }
        deployments
    }

    /// Master and worker nodes keyed by name.
    pub async fn nodes(&self, diagnostics: &mut Diagnostics) -> BTreeMap<String, Node> {
        nodes::classify_nodes(self.executor, &self.settings, diagnostics).await
    }

    /// Cluster CRD names matching any of `filters`.
    pub async fn crd_names(
        &self,
        filters: &[CrdFilter],
        diagnostics: &mut Diagnostics,
    ) -> Vec<String> {
        crds::find_crd_names(self.executor, &self.settings, filters, diagnostics).await
    }
}
