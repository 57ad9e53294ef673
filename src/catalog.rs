//! The target catalog and the entities it holds.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Vendor prefix shared by every discovery label and annotation.
pub const LABEL_PREFIX: &str = "test-network-function.com";

/// Empty label value: match any value for the key.
pub const ANY_LABEL_VALUE: &str = "";

/// A label selector triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub prefix: String,
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl Label {
    pub fn new(
        prefix: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
            value: value.into(),
        }
    }

    /// A label under [`LABEL_PREFIX`] matching any value.
    pub fn any_value(name: impl Into<String>) -> Self {
        Self::new(LABEL_PREFIX, name, ANY_LABEL_VALUE)
    }

    pub fn is_wildcard(&self) -> bool {
        self.value == ANY_LABEL_VALUE
    }

    /// The label key: `prefix/name`, or just `name` without a prefix.
    pub fn key(&self) -> String {
        if self.prefix.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.prefix, self.name)
        }
    }

    /// Kubernetes selector string: `key` for a wildcard, `key=value` otherwise.
    pub fn selector(&self) -> String {
        if self.is_wildcard() {
            self.key()
        } else {
            format!("{}={}", self.key(), self.value)
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.selector())
    }
}

/// Retains CRD names ending with `name_suffix`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CrdFilter {
    pub name_suffix: String,
}

impl CrdFilter {
    pub fn new(name_suffix: impl Into<String>) -> Self {
        Self {
            name_suffix: name_suffix.into(),
        }
    }

    pub fn matches(&self, crd_name: &str) -> bool {
        crd_name.ends_with(&self.name_suffix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pod {
    pub namespace: String,
    pub name: String,
    pub service_account: String,
    pub container_count: usize,
    pub tests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Operator {
    pub name: String,
    pub namespace: String,
    /// Empty when the CSV carries no subscription annotation.
    pub subscription_name: String,
    pub tests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Deployment {
    pub name: String,
    pub namespace: String,
    pub replicas: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Master,
    Worker,
}

impl NodeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Worker => "worker",
        }
    }

    /// The node label that marks membership in this role.
    pub fn node_label(&self) -> &'static str {
        match self {
            Self::Master => "node-role.kubernetes.io/master",
            Self::Worker => "node-role.kubernetes.io/worker",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub roles: BTreeSet<NodeRole>,
}

impl Node {
    pub fn new(name: impl Into<String>, role: NodeRole) -> Self {
        Self {
            name: name.into(),
            roles: BTreeSet::from([role]),
        }
    }

    pub fn has_role(&self, role: NodeRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_master(&self) -> bool {
        self.has_role(NodeRole::Master)
    }

    pub fn is_worker(&self) -> bool {
        self.has_role(NodeRole::Worker)
    }
}

/// Locates one container of one pod.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContainerIdentifier {
    pub namespace: String,
    pub pod_name: String,
    pub container_name: String,
    pub node_name: String,
    pub container_uid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContainerConfig {
    pub identifier: ContainerIdentifier,
    pub default_network_device: String,
    pub multus_ip_addresses: Vec<String>,
}

/// Everything discovery found, handed to the test engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TestTarget {
    pub pods_under_test: Vec<Pod>,
    pub container_config_list: Vec<ContainerConfig>,
    pub operators: Vec<Operator>,
    pub deployments_under_test: Vec<Deployment>,
    pub nodes: BTreeMap<String, Node>,
    pub exclude_containers_from_connectivity_tests: Vec<ContainerIdentifier>,
    pub crd_names: Vec<String>,
}

impl TestTarget {
    pub fn is_empty(&self) -> bool {
        self.pods_under_test.is_empty()
            && self.container_config_list.is_empty()
            && self.operators.is_empty()
            && self.deployments_under_test.is_empty()
            && self.nodes.is_empty()
            && self.exclude_containers_from_connectivity_tests.is_empty()
            && self.crd_names.is_empty()
    }

    /// Collapse entries that several labels contributed for the same resource.
    ///
    /// Pods and deployments keep their first occurrence by `(namespace, name)`;
    /// container configs keep their first occurrence by identifier. Discovery
    /// never calls this itself.
    pub fn dedup_by_identity(&mut self) {
        let mut seen = HashSet::new();
        self.pods_under_test
            .retain(|p| seen.insert((p.namespace.clone(), p.name.clone())));

        let mut seen = HashSet::new();
        self.deployments_under_test
            .retain(|d| seen.insert((d.namespace.clone(), d.name.clone())));

        let mut seen = HashSet::new();
        self.container_config_list
            .retain(|c| seen.insert(c.identifier.clone()));
    }
}
