//! Master/worker node classification.

use std::collections::BTreeMap;

use tracing::{debug, error};

use super::CommandSettings;
use crate::catalog::{Node, NodeRole};
use crate::diagnostics::{Diagnostics, Step};
use crate::error::DiscoveryError;
use crate::k8s::exec::{execute_command, CommandExecutor};

/// Roles in query order.
const ROLES: [NodeRole; 2] = [NodeRole::Master, NodeRole::Worker];

/// Command listing the names of nodes carrying `role`'s label, one per line.
pub fn node_names_command(binary: &str, role: NodeRole) -> String {
    format!(
        "{binary} get nodes -l {} -o custom-columns=NAME:.metadata.name --no-headers",
        role.node_label()
    )
}

/// Node names from command output; tolerates a `NAME` header and `node/` prefixes.
pub fn parse_node_names(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && *l != "NAME")
        .map(|l| l.strip_prefix("node/").unwrap_or(l).to_string())
        .collect()
}

/// Add `names` to `nodes` under `role`, accumulating roles on names already present.
pub fn merge_role(nodes: &mut BTreeMap<String, Node>, role: NodeRole, names: Vec<String>) {
    for name in names {
        nodes
            .entry(name)
            .and_modify(|n| {
                n.roles.insert(role);
            })
            .or_insert_with_key(|name| Node::new(name.clone(), role));
    }
}

/// Query master and worker nodes independently and merge them by name.
///
/// A failed role query is logged and recorded; the other role still contributes.
pub async fn classify_nodes(
    executor: &dyn CommandExecutor,
    settings: &CommandSettings,
    diagnostics: &mut Diagnostics,
) -> BTreeMap<String, Node> {
    let mut nodes = BTreeMap::new();
    for role in ROLES {
        match query_role(executor, settings, role).await {
            Ok(names) => {
                debug!(%role, count = names.len(), "found nodes");
                merge_role(&mut nodes, role, names);
            }
            Err(e) => diagnostics.record(Step::NodeQuery, role.as_str(), e),
        }
    }
    nodes
}

async fn query_role(
    executor: &dyn CommandExecutor,
    settings: &CommandSettings,
    role: NodeRole,
) -> Result<Vec<String>, DiscoveryError> {
    let command = node_names_command(&settings.binary, role);
    let output = execute_command(executor, &command, settings.timeout, |e| {
        error!(%role, error = %e, "unable to get node list");
    })
    .await?;
    Ok(parse_node_names(&output))
}
