// ── Domain model ──
//
// Canonical types shared by every controller component. Wire types from
// `fwdctl-api` are converted into these at the client boundary.

pub mod node;
pub mod page;
pub mod rule;
pub mod selection;
pub mod status;

pub use node::{DEFAULT_NODE_PORT, Node, NodeDraft};
pub use page::{DEFAULT_PAGE_SIZE, Page};
pub use rule::{LISTEN_HOST, Rule, port_of};
pub use selection::{Selection, SelectionChange};
pub use status::{RUNNING_STATUSES, ServiceAction, ServiceStatus};
