// ── Node registry client ──
//
// The panel keeps remote nodes in a positional list. Every call here
// returns the full, updated list so callers never hold a stale snapshot
// longer than one operation.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use fwdctl_api::PanelClient;

use crate::error::CoreError;
use crate::model::{Node, NodeDraft, Selection};
use crate::target::{Operation, Target};

/// Result of probing a node through the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum Reachability {
    Reachable,
    Unreachable(String),
}

impl Reachability {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable)
    }
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reachable => f.write_str("reachable"),
            Self::Unreachable(reason) => write!(f, "unreachable: {reason}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeRegistry {
    client: PanelClient,
}

impl NodeRegistry {
    pub fn new(client: PanelClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Node>, CoreError> {
        let nodes = self.client.list_nodes().await?;
        Ok(nodes.into_iter().map(Node::from).collect())
    }

    /// Validate `draft` and register it.
    ///
    /// A blank name, host or credential fails with `MissingField` before
    /// anything is sent.
    pub async fn add(&self, draft: NodeDraft) -> Result<Vec<Node>, CoreError> {
        let node = draft.validate()?;
        let nodes = self.client.add_node(&node.to_record()).await?;
        info!(name = %node.name, host = %node.host, port = node.port, "node registered");
        Ok(nodes.into_iter().map(Node::from).collect())
    }

    /// Remove the node at `index`. Every later node shifts down by one.
    pub async fn remove(&self, index: usize) -> Result<Vec<Node>, CoreError> {
        let nodes = self.client.remove_node(index).await?;
        info!(index, remaining = nodes.len(), "node removed");
        Ok(nodes.into_iter().map(Node::from).collect())
    }

    /// Probe the node at `index` with a status call routed through the panel.
    ///
    /// `node_count` is the caller's registry snapshot; an index outside it
    /// is an `InvalidTarget` error rather than an unreachable node.
    pub async fn test(&self, index: usize, node_count: usize) -> Result<Reachability, CoreError> {
        let target = Target::resolve(Selection::Remote(index), node_count)?;
        let endpoint = target.endpoint(&Operation::GetStatus);
        let reachability = match self.client.service_status(&endpoint).await {
            Ok(_) => Reachability::Reachable,
            Err(e) => Reachability::Unreachable(CoreError::from(e).to_string()),
        };
        debug!(index, %reachability, "node probe");
        Ok(reachability)
    }
}
