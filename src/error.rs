//! Error taxonomy for target discovery.
//!
//! None of these are fatal to a discovery run: each is logged where it occurs,
//! recorded in [`Diagnostics`](crate::diagnostics::Diagnostics), and the
//! affected step degrades to a safe default.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DiscoveryError {
    /// Transport or API error reaching the cluster
    #[error("failed to list {resource} with selector '{selector}': {message}")]
    Query {
        resource: &'static str,
        selector: String,
        message: String,
    },

    /// An external command ran but did not succeed
    #[error("command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    /// An external command did not finish within its deadline
    #[error("command '{command}' timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("annotation '{key}' is not set")]
    AnnotationMissing { key: String },

    /// Annotation present but not a JSON list of strings
    #[error("annotation '{key}' is malformed: {reason}")]
    AnnotationMalformed { key: String, reason: String },

    /// Command output that should have been JSON could not be decoded
    #[error("failed to decode command output: {0}")]
    Decode(String),

    /// The configured test-definition file could not be loaded
    #[error("failed to load test configuration '{path}': {reason}")]
    ConfigLoad { path: String, reason: String },
}

impl DiscoveryError {
    pub fn query(resource: &'static str, selector: impl Into<String>, err: impl ToString) -> Self {
        Self::Query {
            resource,
            selector: selector.into(),
            message: err.to_string(),
        }
    }

    pub fn annotation_missing(key: impl Into<String>) -> Self {
        Self::AnnotationMissing { key: key.into() }
    }

    pub fn annotation_malformed(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::AnnotationMalformed {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// True for the two annotation variants, which callers answer with a fallback.
    pub fn is_annotation_error(&self) -> bool {
        matches!(
            self,
            Self::AnnotationMissing { .. } | Self::AnnotationMalformed { .. }
        )
    }
}
