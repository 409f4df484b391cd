//! Rule and node management controller for port-forwarding panels.
//!
//! Sits between `fwdctl-api` and the CLI. A panel manages forwarding
//! rules for its own host and, through a per-node proxy, for any number of
//! registered remote nodes. This crate decides which endpoint every
//! operation hits and in what order things happen:
//!
//! - **[`Controller`]**: cheaply cloneable facade. Callers own a
//!   [`ControllerState`] and feed it through
//!   [`handle()`](Controller::handle) with one [`Intent`] at a time,
//!   getting back the next state and an [`Outcome`].
//!
//! - **[`codec`]**: batch line parsing (`port,host,port` and the legacy
//!   `port:remote` form).
//!
//! - **[`conflict`]**: advisory listen-port conflict checks against the
//!   loaded page, plus in-batch port reservations.
//!
//! - **[`target`]**: maps an [`Operation`] and a [`Selection`] to one
//!   concrete panel endpoint.
//!
//! - **[`orchestrator`]**: mutate, restart, refresh. Single changes walk
//!   an explicit [`MutationState`] machine; batches report per-line
//!   failures and restart at most once.
//!
//! - **[`StatusPoller`]**: background status checks on a `watch` channel.

pub mod codec;
pub mod config;
pub mod conflict;
pub mod controller;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod poll;
pub mod registry;
pub mod rules;
pub mod service;
pub mod target;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControllerConfig, DEFAULT_POLL_INTERVAL, TlsVerification};
pub use controller::{Controller, ControllerState, Intent, Outcome};
pub use error::CoreError;
pub use orchestrator::{
    BatchReport, LineFailure, MutationReport, MutationState, RestartOutcome, RuleMutation,
};
pub use poll::StatusPoller;
pub use registry::Reachability;
pub use rules::{RuleListing, ViewRefresh};
pub use target::{Operation, Target};

pub use model::{
    DEFAULT_NODE_PORT, DEFAULT_PAGE_SIZE, Node, NodeDraft, Page, Rule, Selection,
    SelectionChange, ServiceAction, ServiceStatus,
};
