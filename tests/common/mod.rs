//! In-memory collaborators and resource fixtures shared by the integration tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::{
    api::{
        apps::v1::{Deployment, DeploymentSpec},
        core::v1::{Container, ContainerStatus, Pod, PodSpec, PodStatus},
    },
    apimachinery::pkg::apis::meta::v1::ObjectMeta,
};
use kube::api::DynamicObject;

use targetscout::catalog::Label;
use targetscout::error::DiscoveryError;
use targetscout::k8s::exec::CommandExecutor;
use targetscout::k8s::query::{csv_api_resource, ResourceQuery};

// ── Resource fixtures ─────────────────────────────────────────────────────────

pub fn meta(namespace: &str, name: &str, annotations: &[(&str, &str)]) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        annotations: if annotations.is_empty() {
            None
        } else {
            Some(
                annotations
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect::<BTreeMap<_, _>>(),
            )
        },
        ..Default::default()
    }
}

pub fn pod(namespace: &str, name: &str, containers: &[&str], annotations: &[(&str, &str)]) -> Pod {
    Pod {
        metadata: meta(namespace, name, annotations),
        spec: Some(PodSpec {
            service_account_name: Some("default".to_string()),
            node_name: Some("worker-0".to_string()),
            containers: containers
                .iter()
                .map(|c| Container {
                    name: (*c).to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }),
        status: Some(PodStatus {
            container_statuses: Some(
                containers
                    .iter()
                    .map(|c| ContainerStatus {
                        name: (*c).to_string(),
                        container_id: Some(format!("cri-o://{c}-uid")),
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        }),
    }
}

pub fn deployment(namespace: &str, name: &str, replicas: Option<i32>) -> Deployment {
    Deployment {
        metadata: meta(namespace, name, &[]),
        spec: Some(DeploymentSpec {
            replicas,
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn csv(namespace: &str, name: &str, annotations: &[(&str, &str)]) -> DynamicObject {
    let mut obj = DynamicObject::new(name, &csv_api_resource()).within(namespace);
    obj.metadata = meta(namespace, name, annotations);
    obj
}

// ── ResourceQuery fake ────────────────────────────────────────────────────────

/// Answers queries from per-selector tables; unknown selectors return an empty list.
#[derive(Default)]
pub struct FakeQuery {
    pub pods: HashMap<String, Vec<Pod>>,
    pub deployments: HashMap<String, Vec<Deployment>>,
    pub csvs: Vec<DynamicObject>,
    /// Selectors whose queries fail, for every resource kind.
    pub failing: Vec<String>,
    pub fail_csvs: bool,
    /// Every (kind, selector, namespace) queried, in order.
    pub calls: Mutex<Vec<(String, String, String)>>,
}

impl FakeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pods(mut self, label: &Label, pods: Vec<Pod>) -> Self {
        self.pods.insert(label.selector(), pods);
        self
    }

    pub fn with_deployments(mut self, label: &Label, deployments: Vec<Deployment>) -> Self {
        self.deployments.insert(label.selector(), deployments);
        self
    }

    pub fn with_csvs(mut self, csvs: Vec<DynamicObject>) -> Self {
        self.csvs = csvs;
        self
    }

    pub fn failing_for(mut self, label: &Label) -> Self {
        self.failing.push(label.selector());
        self
    }

    fn check(&self, kind: &'static str, label: &Label, namespace: &str) -> Result<(), DiscoveryError> {
        let selector = label.selector();
        self.calls.lock().unwrap().push((
            kind.to_string(),
            selector.clone(),
            namespace.to_string(),
        ));
        if self.failing.contains(&selector) {
            return Err(DiscoveryError::query(kind, selector, "connection refused"));
        }
        Ok(())
    }

    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceQuery for FakeQuery {
    async fn pods(&self, label: &Label, namespace: &str) -> Result<Vec<Pod>, DiscoveryError> {
        self.check("pods", label, namespace)?;
        Ok(self.pods.get(&label.selector()).cloned().unwrap_or_default())
    }

    async fn deployments(
        &self,
        label: &Label,
        namespace: &str,
    ) -> Result<Vec<Deployment>, DiscoveryError> {
        self.check("deployments", label, namespace)?;
        Ok(self
            .deployments
            .get(&label.selector())
            .cloned()
            .unwrap_or_default())
    }

    async fn cluster_service_versions(
        &self,
        label: &Label,
        namespace: &str,
    ) -> Result<Vec<DynamicObject>, DiscoveryError> {
        self.check("clusterserviceversions", label, namespace)?;
        if self.fail_csvs {
            return Err(DiscoveryError::query(
                "clusterserviceversions",
                label.selector(),
                "the server could not find the requested resource",
            ));
        }
        Ok(self.csvs.clone())
    }
}

// ── CommandExecutor fake ──────────────────────────────────────────────────────

/// Returns canned output for commands containing a given fragment.
#[derive(Default)]
pub struct FakeExecutor {
    responses: Vec<(String, Result<String, DiscoveryError>)>,
    pub commands: Mutex<Vec<(String, Duration)>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, fragment: &str, output: &str) -> Self {
        self.responses
            .push((fragment.to_string(), Ok(output.to_string())));
        self
    }

    pub fn fail(mut self, fragment: &str) -> Self {
        self.responses.push((
            fragment.to_string(),
            Err(DiscoveryError::CommandFailed {
                command: fragment.to_string(),
                message: "exited with exit status: 1: error: You must be logged in to the server"
                    .to_string(),
            }),
        ));
        self
    }

    /// Standard node listings: `masters` under the master label, `workers` under the worker label.
    pub fn with_nodes(self, masters: &[&str], workers: &[&str]) -> Self {
        self.respond("node-role.kubernetes.io/master", &masters.join("\n"))
            .respond("node-role.kubernetes.io/worker", &workers.join("\n"))
    }

    pub fn commands(&self) -> Vec<(String, Duration)> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for FakeExecutor {
    async fn run(&self, command: &str, timeout: Duration) -> Result<String, DiscoveryError> {
        self.commands
            .lock()
            .unwrap()
            .push((command.to_string(), timeout));
        self.responses
            .iter()
            .find(|(fragment, _)| command.contains(fragment.as_str()))
            .map(|(_, r)| r.clone())
            .unwrap_or_else(|| {
                Err(DiscoveryError::CommandFailed {
                    command: command.to_string(),
                    message: "no canned response".to_string(),
                })
            })
    }
}
