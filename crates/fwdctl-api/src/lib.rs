// fwdctl-api: Async Rust client for the port-forwarding panel API

pub mod client;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod nodes;
pub mod transport;

mod rules;
mod service;

pub use client::PanelClient;
pub use endpoint::{Endpoint, Method};
pub use error::Error;
pub use models::{NodeRecord, RulePage, RuleRecord, StatusReply};
pub use transport::{TlsMode, TransportConfig};
