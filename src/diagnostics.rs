//! Structured record of everything that went wrong during a discovery run.

use std::fmt;

use serde::Serialize;

use crate::error::DiscoveryError;

/// The discovery step a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    PodQuery,
    PodTests,
    ConnectivityExclusion,
    OperatorQuery,
    OperatorTests,
    SubscriptionName,
    DeploymentQuery,
    NodeQuery,
    CrdQuery,
    TestCatalog,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PodQuery => "pod_query",
            Self::PodTests => "pod_tests",
            Self::ConnectivityExclusion => "connectivity_exclusion",
            Self::OperatorQuery => "operator_query",
            Self::OperatorTests => "operator_tests",
            Self::SubscriptionName => "subscription_name",
            Self::DeploymentQuery => "deployment_query",
            Self::NodeQuery => "node_query",
            Self::CrdQuery => "crd_query",
            Self::TestCatalog => "test_catalog",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub step: Step,
    /// What was being processed: a label selector, `namespace/name`, a role.
    pub subject: String,
    pub error: DiscoveryError,
}

impl Serialize for Diagnostic {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Diagnostic", 3)?;
        s.serialize_field("step", &self.step)?;
        s.serialize_field("subject", &self.subject)?;
        s.serialize_field("error", &self.error.to_string())?;
        s.end()
    }
}

/// Failure sink filled by a discovery run, in the order failures occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: Step, subject: impl Into<String>, error: DiscoveryError) {
        self.records.push(Diagnostic {
            step,
            subject: subject.into(),
            error,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter()
    }

    /// All records for one step.
    pub fn for_step(&self, step: Step) -> Vec<&Diagnostic> {
        self.records.iter().filter(|d| d.step == step).collect()
    }

    pub fn has_step(&self, step: Step) -> bool {
        self.records.iter().any(|d| d.step == step)
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.records.extend(other.records);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
