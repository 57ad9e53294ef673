use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use targetscout::config::DiscoveryConfig;
use targetscout::k8s::client::{build_client, current_context};
use targetscout::k8s::exec::ShellExecutor;
use targetscout::k8s::query::KubeResourceQuery;
use targetscout::testcases::{StaticTestCatalog, TestCatalogProvider, TestFileCatalog};
use targetscout::{Discovery, TestTarget};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the catalog JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = DiscoveryConfig::load()?;
    if config.target_labels.is_empty() {
        warn!("no target labels configured; only operators, nodes and CRDs will be discovered");
    }

    let client = build_client(config.context.as_deref(), config.kubeconfig.as_deref()).await?;
    info!(
        context = %config.context.clone().unwrap_or_else(current_context),
        namespace = %config.namespace,
        "starting discovery"
    );

    let test_catalog: Box<dyn TestCatalogProvider> = match &config.test_catalog {
        Some(path) => {
            let catalog = TestFileCatalog::new(path);
            info!(path = %catalog.path().display(), "using test catalog file");
            Box::new(catalog)
        }
        None => Box::new(StaticTestCatalog::default()),
    };
    let query = KubeResourceQuery::new(client);
    let executor = ShellExecutor::new();
    let discovery = Discovery::new(&query, &executor, test_catalog.as_ref())
        .with_settings(config.command_settings());
    info!(
        binary = %discovery.settings().binary,
        timeout = ?discovery.settings().timeout,
        "cluster commands configured"
    );

    let mut target = TestTarget::default();
    let diagnostics = discovery
        .find_test_target(
            &config.target_labels,
            &config.crd_filters,
            &config.namespace,
            &mut target,
        )
        .await;
    if config.dedup_targets {
        target.dedup_by_identity();
    }

    for d in diagnostics.iter() {
        warn!(step = %d.step, subject = %d.subject, error = %d.error, "degraded discovery");
    }

    let json = serde_json::to_string_pretty(&target).context("Failed to serialize test target")?;
    println!("{json}");
    Ok(())
}
