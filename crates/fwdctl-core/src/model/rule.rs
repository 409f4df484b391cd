// ── Forwarding rule ──

use serde::{Deserialize, Serialize};

use fwdctl_api::RuleRecord;

/// Host every synthesized listen address binds to.
pub const LISTEN_HOST: &str = "0.0.0.0";

/// One listen → remote mapping.
///
/// `listen` is the identity key: deletions address a rule by its exact
/// listen string as the server reported it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub listen: String,
    pub remote: String,
}

impl Rule {
    pub fn new(listen: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            listen: listen.into(),
            remote: remote.into(),
        }
    }

    /// A rule listening on `0.0.0.0:{local_port}`.
    pub fn forward(local_port: &str, remote: impl Into<String>) -> Self {
        Self::new(format!("{LISTEN_HOST}:{local_port}"), remote)
    }

    /// Port component of the listen address.
    pub fn listen_port(&self) -> &str {
        port_of(&self.listen)
    }

    /// Remote host, with IPv6 brackets kept as written.
    pub fn remote_host(&self) -> &str {
        self.remote
            .rsplit_once(':')
            .map_or(self.remote.as_str(), |(host, _)| host)
    }

    /// Remote port, empty when the remote has no colon.
    pub fn remote_port(&self) -> &str {
        self.remote.rsplit_once(':').map_or("", |(_, port)| port)
    }

    pub fn to_record(&self) -> RuleRecord {
        RuleRecord {
            listen: self.listen.clone(),
            remote: self.remote.clone(),
        }
    }
}

impl From<RuleRecord> for Rule {
    fn from(r: RuleRecord) -> Self {
        Self {
            listen: r.listen,
            remote: r.remote,
        }
    }
}

/// Substring after the last colon, or the whole address when there is none.
///
/// Splitting on the last colon tolerates IPv6-style listen hosts.
pub fn port_of(address: &str) -> &str {
    address.rsplit_once(':').map_or(address, |(_, port)| port)
}
