//! Boundary to externally executed cluster commands (node listings, CRD listing).

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::DiscoveryError;

/// Deadline applied to each command unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs a command line and returns its standard output.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, command: &str, timeout: Duration) -> Result<String, DiscoveryError>;
}

/// Runs commands through `sh -c`, so pipelines like `kubectl ... | jq ...` work.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self {
            shell: "sh".to_string(),
        }
    }

    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn run(&self, command: &str, timeout: Duration) -> Result<String, DiscoveryError> {
        debug!(command, ?timeout, "executing command");
        let failed = |message: String| DiscoveryError::CommandFailed {
            command: command.to_string(),
            message,
        };

        // kill_on_drop reaps the child when the timeout drops the future
        let child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(timeout, child)
            .await
            .map_err(|_| DiscoveryError::Timeout {
                command: command.to_string(),
                timeout,
            })?
            .map_err(|e| failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Run `command`, calling `on_failure` before handing back any error.
pub async fn execute_command<F>(
    executor: &dyn CommandExecutor,
    command: &str,
    timeout: Duration,
    on_failure: F,
) -> Result<String, DiscoveryError>
where
    F: FnOnce(&DiscoveryError),
{
    let result = executor.run(command, timeout).await;
    if let Err(e) = &result {
        on_failure(e);
    }
    result
}
