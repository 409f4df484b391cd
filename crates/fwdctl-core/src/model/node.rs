// ── Remote node ──

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use fwdctl_api::NodeRecord;

use crate::error::CoreError;

/// Management port assumed when a node is registered without one.
pub const DEFAULT_NODE_PORT: u16 = 8080;

/// A registered remote management endpoint.
///
/// Nodes have no stable id: a node *is* its position in the registry, and
/// every removal shifts the nodes after it.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub name: String,
    pub host: String,
    pub port: u16,
    #[serde(skip)]
    pub password: SecretString,
    pub https: bool,
}

impl Node {
    /// Display label: the name, or `host:port` when unnamed.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("{}:{}", self.host, self.port)
        } else {
            self.name.clone()
        }
    }

    /// Management URL of the node itself.
    pub fn url(&self) -> String {
        let scheme = if self.https { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }

    pub fn to_record(&self) -> NodeRecord {
        NodeRecord {
            name: self.name.clone(),
            host: self.host.clone(),
            port: self.port,
            password: self.password.expose_secret().to_owned(),
            https: self.https,
        }
    }
}

impl From<NodeRecord> for Node {
    fn from(r: NodeRecord) -> Self {
        Self {
            name: r.name,
            host: r.host,
            port: r.port,
            password: SecretString::from(r.password),
            https: r.https,
        }
    }
}

/// A node as entered by the user, before validation.
#[derive(Debug, Clone)]
pub struct NodeDraft {
    pub name: String,
    pub host: String,
    pub port: Option<u16>,
    pub password: SecretString,
    pub https: bool,
}

impl NodeDraft {
    /// Check required fields and apply the default port.
    ///
    /// Name, host and credential must be non-blank.
    pub fn validate(self) -> Result<Node, CoreError> {
        let name = self.name.trim().to_owned();
        let host = self.host.trim().to_owned();
        if name.is_empty() {
            return Err(CoreError::MissingField { field: "name" });
        }
        if host.is_empty() {
            return Err(CoreError::MissingField { field: "host" });
        }
        if self.password.expose_secret().is_empty() {
            return Err(CoreError::MissingField { field: "password" });
        }
        Ok(Node {
            name,
            host,
            port: self.port.unwrap_or(DEFAULT_NODE_PORT),
            password: self.password,
            https: self.https,
        })
    }
}
