//! Globally configured test groups, used when a resource carries no test annotation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::diagnostics::{Diagnostics, Step};
use crate::error::DiscoveryError;

/// A named bundle of test cases.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TestGroup {
    pub name: String,
    #[serde(default)]
    pub tests: Vec<String>,
}

/// Contents of the test-definition file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfiguredTests {
    #[serde(default)]
    pub pod_tests: Vec<TestGroup>,
    #[serde(default)]
    pub operator_tests: Vec<TestGroup>,
}

impl ConfiguredTests {
    pub fn pod_test_names(&self) -> Vec<String> {
        self.pod_tests.iter().map(|g| g.name.clone()).collect()
    }

    pub fn operator_test_names(&self) -> Vec<String> {
        self.operator_tests.iter().map(|g| g.name.clone()).collect()
    }
}

/// Source of the fallback test-group lists.
pub trait TestCatalogProvider: Send + Sync {
    /// Where the tests come from, for log messages.
    fn source(&self) -> String;

    fn configured_tests(&self) -> Result<ConfiguredTests, DiscoveryError>;
}

/// Reads a TOML test-definition file on every call, so edits between runs are seen.
#[derive(Debug, Clone)]
pub struct TestFileCatalog {
    path: PathBuf,
}

impl TestFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TestCatalogProvider for TestFileCatalog {
    fn source(&self) -> String {
        self.path.display().to_string()
    }

    fn configured_tests(&self) -> Result<ConfiguredTests, DiscoveryError> {
        let load_err = |reason: String| DiscoveryError::ConfigLoad {
            path: self.source(),
            reason,
        };
        let content = std::fs::read_to_string(&self.path).map_err(|e| load_err(e.to_string()))?;
        toml::from_str(&content).map_err(|e| load_err(e.to_string()))
    }
}

/// A fixed set of test groups.
#[derive(Debug, Clone, Default)]
pub struct StaticTestCatalog {
    tests: ConfiguredTests,
}

impl StaticTestCatalog {
    pub fn new(tests: ConfiguredTests) -> Self {
        Self { tests }
    }

    /// Groups with the given names and no individual test cases.
    pub fn from_names(pod_groups: &[&str], operator_groups: &[&str]) -> Self {
        let groups = |names: &[&str]| {
            names
                .iter()
                .map(|n| TestGroup {
                    name: (*n).to_string(),
                    tests: Vec::new(),
                })
                .collect()
        };
        Self::new(ConfiguredTests {
            pod_tests: groups(pod_groups),
            operator_tests: groups(operator_groups),
        })
    }
}

impl TestCatalogProvider for StaticTestCatalog {
    fn source(&self) -> String {
        "static test catalog".to_string()
    }

    fn configured_tests(&self) -> Result<ConfiguredTests, DiscoveryError> {
        Ok(self.tests.clone())
    }
}

/// Names of every configured pod test group; empty (and recorded) when the catalog can't load.
pub fn configured_pod_tests(
    provider: &dyn TestCatalogProvider,
    diagnostics: &mut Diagnostics,
) -> Vec<String> {
    load_names(provider, diagnostics, ConfiguredTests::pod_test_names, "pod")
}

/// Names of every configured operator test group; empty (and recorded) when the catalog can't load.
pub fn configured_operator_tests(
    provider: &dyn TestCatalogProvider,
    diagnostics: &mut Diagnostics,
) -> Vec<String> {
    load_names(
        provider,
        diagnostics,
        ConfiguredTests::operator_test_names,
        "operator",
    )
}

fn load_names(
    provider: &dyn TestCatalogProvider,
    diagnostics: &mut Diagnostics,
    names: fn(&ConfiguredTests) -> Vec<String>,
    kind: &str,
) -> Vec<String> {
    match provider.configured_tests() {
        Ok(tests) => {
            let names = names(&tests);
            info!(source = %provider.source(), tests = ?names, "got all {kind} tests");
            names
        }
        Err(e) => {
            error!(source = %provider.source(), error = %e, "failed to load {kind} tests, continuing with no tests");
            diagnostics.record(Step::TestCatalog, provider.source(), e);
            Vec::new()
        }
    }
}
