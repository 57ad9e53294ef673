use anyhow::{Context, Result};
use kube::{config::KubeConfigOptions, Client};

/// Build a kube::Client, optionally for a named context and/or an explicit kubeconfig path.
/// With neither, uses the default inference chain ($KUBECONFIG, ~/.kube/config, in-cluster).
pub async fn build_client(context: Option<&str>, kubeconfig: Option<&str>) -> Result<Client> {
    if context.is_none() && kubeconfig.is_none() {
        return Client::try_default()
            .await
            .context("Failed to build Kubernetes client");
    }

    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    let config = match kubeconfig {
        Some(path) => {
            let kc = kube::config::Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig '{path}'"))?;
            kube::Config::from_custom_kubeconfig(kc, &options).await
        }
        None => kube::Config::from_kubeconfig(&options).await,
    }
    .with_context(|| {
        format!(
            "Failed to load kubeconfig context '{}'",
            context.unwrap_or("<current>")
        )
    })?;

    Client::try_from(config).context("Failed to build Kubernetes client")
}

/// Return the current context name from kubeconfig (for log output).
pub fn current_context() -> String {
    kube::config::Kubeconfig::read()
        .ok()
        .and_then(|cfg| cfg.current_context)
        .unwrap_or_else(|| "unknown".to_string())
}
