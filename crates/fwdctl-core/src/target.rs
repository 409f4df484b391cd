// ── Target resolution ──
//
// Maps an abstract operation plus the current selection onto one concrete
// panel endpoint. Local operations hit the panel's own fixed paths; remote
// operations go through the panel's per-node proxy under
// `/api/nodes/{index}/`.

use fwdctl_api::Endpoint;
use fwdctl_api::nodes::NODES_PATH;

use crate::error::CoreError;
use crate::model::{Selection, ServiceAction};

/// A selection validated against a node registry snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Local,
    Remote(usize),
}

/// Everything the controller can ask of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ListRules { page: u32, size: u32 },
    /// The rule itself travels as the request body.
    AddRule,
    DeleteRule { listen: String },
    GetStatus,
    Control(ServiceAction),
}

impl Target {
    /// Validate `selection` against a registry of `node_count` nodes.
    pub fn resolve(selection: Selection, node_count: usize) -> Result<Self, CoreError> {
        match selection {
            Selection::Local => Ok(Self::Local),
            Selection::Remote(index) if index < node_count => Ok(Self::Remote(index)),
            Selection::Remote(index) => Err(CoreError::InvalidTarget {
                index,
                nodes: node_count,
            }),
        }
    }

    pub fn selection(self) -> Selection {
        match self {
            Self::Local => Selection::Local,
            Self::Remote(i) => Selection::Remote(i),
        }
    }

    /// The single endpoint serving `op` on this target.
    pub fn endpoint(self, op: &Operation) -> Endpoint {
        match self {
            Self::Local => local_endpoint(op),
            Self::Remote(index) => remote_endpoint(index, op),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote(i) => write!(f, "node #{i}"),
        }
    }
}

/// Resolve `op` for `selection` in one step.
pub fn resolve(
    op: &Operation,
    selection: Selection,
    node_count: usize,
) -> Result<Endpoint, CoreError> {
    Ok(Target::resolve(selection, node_count)?.endpoint(op))
}

fn local_endpoint(op: &Operation) -> Endpoint {
    match op {
        Operation::ListRules { page, size } => Endpoint::get("/get_rules")
            .with_query("page", page)
            .with_query("size", size),
        Operation::AddRule => Endpoint::post("/add_rule"),
        Operation::DeleteRule { listen } => {
            Endpoint::delete("/delete_rule").with_query("listen", listen)
        }
        Operation::GetStatus => Endpoint::get("/check_status"),
        Operation::Control(action) => Endpoint::post(match action {
            ServiceAction::Start => "/start_service",
            ServiceAction::Stop => "/stop_service",
            ServiceAction::Restart => "/restart_service",
        }),
    }
}

fn remote_endpoint(index: usize, op: &Operation) -> Endpoint {
    let base = format!("{NODES_PATH}/{index}");
    match op {
        Operation::ListRules { page, size } => Endpoint::get(format!("{base}/rules"))
            .with_query("page", page)
            .with_query("size", size),
        Operation::AddRule => Endpoint::post(format!("{base}/rules")),
        Operation::DeleteRule { listen } => {
            Endpoint::delete(format!("{base}/rules")).with_query("listen", listen)
        }
        Operation::GetStatus => Endpoint::get(format!("{base}/status")),
        Operation::Control(action) => Endpoint::post(format!("{base}/{action}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fwdctl_api::Method;
    use pretty_assertions::assert_eq;

    #[test]
    fn local_endpoints_are_fixed_paths() {
        let t = Target::Local;
        assert_eq!(
            t.endpoint(&Operation::ListRules { page: 2, size: 25 }).to_string(),
            "GET /get_rules?page=2&size=25"
        );
        assert_eq!(t.endpoint(&Operation::AddRule).to_string(), "POST /add_rule");
        assert_eq!(
            t.endpoint(&Operation::DeleteRule {
                listen: "0.0.0.0:80".into()
            })
            .to_string(),
            "DELETE /delete_rule?listen=0.0.0.0:80"
        );
        assert_eq!(
            t.endpoint(&Operation::GetStatus).to_string(),
            "GET /check_status"
        );
        assert_eq!(
            t.endpoint(&Operation::Control(ServiceAction::Stop)).path,
            "/stop_service"
        );
    }

    #[test]
    fn remote_endpoints_are_templated_on_index() {
        let t = Target::Remote(3);
        let list = t.endpoint(&Operation::ListRules { page: 1, size: 10 });
        assert_eq!(list.method, Method::Get);
        assert_eq!(list.path, "/api/nodes/3/rules");
        assert_eq!(
            t.endpoint(&Operation::AddRule).to_string(),
            "POST /api/nodes/3/rules"
        );
        assert_eq!(
            t.endpoint(&Operation::GetStatus).path,
            "/api/nodes/3/status"
        );
        assert_eq!(
            t.endpoint(&Operation::Control(ServiceAction::Restart)).to_string(),
            "POST /api/nodes/3/restart"
        );
    }

    #[test]
    fn out_of_range_selection_is_invalid_target() {
        assert_eq!(
            resolve(&Operation::GetStatus, Selection::Remote(2), 2).unwrap_err(),
            CoreError::InvalidTarget { index: 2, nodes: 2 }
        );
        assert!(resolve(&Operation::GetStatus, Selection::Remote(1), 2).is_ok());
        assert!(resolve(&Operation::GetStatus, Selection::Local, 0).is_ok());
    }
}
