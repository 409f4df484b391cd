// Node registry endpoints
//
// Nodes live in a collection keyed by position: `DELETE /api/nodes/{i}`
// shifts every later node down by one.

use tracing::debug;

use crate::client::PanelClient;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::models::{NodeRecord, nodes_from_body};

/// Collection path of the node registry.
pub const NODES_PATH: &str = "/api/nodes";

impl PanelClient {
    /// List registered nodes.
    ///
    /// `GET /api/nodes` → `{ "nodes": [...] }`. A reply without a `nodes`
    /// list is treated as an empty registry.
    pub async fn list_nodes(&self) -> Result<Vec<NodeRecord>, Error> {
        let body = self.send(&Endpoint::get(NODES_PATH)).await?;
        let nodes = nodes_from_body(&body)?.unwrap_or_default();
        debug!(count = nodes.len(), "fetched node registry");
        Ok(nodes)
    }

    /// Register a node and return the updated registry.
    ///
    /// `POST /api/nodes`. When the reply doesn't echo the list, it is
    /// re-fetched.
    pub async fn add_node(&self, node: &NodeRecord) -> Result<Vec<NodeRecord>, Error> {
        debug!(name = %node.name, host = %node.host, port = node.port, "registering node");
        let body = self.send_json(&Endpoint::post(NODES_PATH), node).await?;
        match nodes_from_body(&body).ok().flatten() {
            Some(nodes) => Ok(nodes),
            None => self.list_nodes().await,
        }
    }

    /// Remove the node at `index` and return the updated registry.
    ///
    /// `DELETE /api/nodes/{index}`.
    pub async fn remove_node(&self, index: usize) -> Result<Vec<NodeRecord>, Error> {
        debug!(index, "removing node");
        let body = self
            .send(&Endpoint::delete(format!("{NODES_PATH}/{index}")))
            .await?;
        match nodes_from_body(&body).ok().flatten() {
            Some(nodes) => Ok(nodes),
            None => self.list_nodes().await,
        }
    }
}
