//! targetscout library — discovery of Kubernetes test targets from labels and annotations.
//! The binary is a thin wrapper; integration tests in tests/ import these modules directly.
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,   // builders and accessors; callers are the orchestrator and tests
    clippy::missing_errors_doc,   // every error type is DiscoveryError or an anyhow context chain
)]

pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod discover;
pub mod error;
pub mod k8s;
pub mod testcases;

pub use catalog::{CrdFilter, Label, TestTarget};
pub use diagnostics::Diagnostics;
pub use discover::Discovery;
pub use error::DiscoveryError;
