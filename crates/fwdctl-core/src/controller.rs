// ── Controller ──
//
// Single entry point for consumers. State is owned by the caller and
// threaded through `handle`: every intent takes the current
// `ControllerState` and returns the next one together with an `Outcome`.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use fwdctl_api::PanelClient;

use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::model::{
    Node, NodeDraft, Page, Rule, Selection, SelectionChange, ServiceAction, ServiceStatus,
};
use crate::orchestrator::{
    BatchReport, MutationReport, MutationState, Orchestrator, RestartOutcome, RuleMutation,
};
use crate::registry::{NodeRegistry, Reachability};
use crate::rules::RuleStore;
use crate::service::ServiceControl;
use crate::target::Target;

// ── ControllerState ──────────────────────────────────────────────

/// Everything the controller knows between intents.
///
/// `rules` is only the current page; `nodes` is the last registry snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ControllerState {
    pub selection: Selection,
    pub page: Page,
    pub rules: Vec<Rule>,
    pub nodes: Vec<Node>,
    pub status: ServiceStatus,
}

impl ControllerState {
    pub fn new(selection: Selection, page_size: u32) -> Self {
        Self {
            selection,
            page: Page::new(1, page_size),
            ..Self::default()
        }
    }

    /// The current selection validated against the node snapshot.
    pub fn target(&self) -> Result<Target, CoreError> {
        Target::resolve(self.selection, self.nodes.len())
    }

    pub fn selected_node(&self) -> Option<&Node> {
        match self.selection {
            Selection::Local => None,
            Selection::Remote(i) => self.nodes.get(i),
        }
    }

    /// Human label of the current target.
    pub fn target_label(&self) -> String {
        self.selected_node()
            .map_or_else(|| "local".to_owned(), Node::label)
    }

    fn reset_to_local(&mut self) {
        self.selection = Selection::Local;
        self.page = self.page.with_page(1);
    }
}

// ── Intent / Outcome ─────────────────────────────────────────────

/// A user request.
#[derive(Debug, Clone)]
pub enum Intent {
    /// Re-fetch the current page and the service status.
    Refresh,
    LoadNodes,
    /// Switch target; resets to page 1.
    SelectTarget(Selection),
    GoToPage(u32),
    NextPage,
    PrevPage,
    /// Change the page size; resets to page 1.
    SetPageSize(u32),
    AddRule {
        local_port: String,
        remote_host: String,
        remote_port: String,
    },
    DeleteRule {
        listen: String,
    },
    BatchAdd {
        text: String,
    },
    Control(ServiceAction),
    CheckStatus,
    AddNode(NodeDraft),
    RemoveNode(usize),
    TestNode(usize),
}

impl Intent {
    /// Intents that change something on the target.
    fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::AddRule { .. } | Self::DeleteRule { .. } | Self::BatchAdd { .. } | Self::Control(_)
        )
    }
}

/// What happened in response to an intent.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The rule view was (re)loaded. `error` is the fetch failure, if any.
    Refreshed { error: Option<CoreError> },
    NodesLoaded { count: usize },
    Mutation(MutationReport),
    Batch(BatchReport),
    Controlled { action: ServiceAction },
    Status(ServiceStatus),
    NodesChanged { count: usize, change: SelectionChange },
    NodeProbe { index: usize, reachability: Reachability },
    Failed(CoreError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        match self {
            Self::Refreshed { error } => error.is_none(),
            Self::Mutation(report) => report.is_success(),
            Self::Batch(report) => report.is_success(),
            Self::NodeProbe { reachability, .. } => reachability.is_reachable(),
            Self::Failed(_) => false,
            Self::NodesLoaded { .. }
            | Self::Controlled { .. }
            | Self::Status(_)
            | Self::NodesChanged { .. } => true,
        }
    }

    /// The error behind a failed outcome, if there is a single one.
    pub fn error(&self) -> Option<&CoreError> {
        match self {
            Self::Refreshed { error } => error.as_ref(),
            Self::Mutation(report) => report.error.as_ref(),
            Self::Batch(report) => match &report.restart {
                RestartOutcome::Failed(e) => Some(e),
                _ => report.failures.first().map(|f| &f.error),
            },
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// One-line (batch: multi-line) notice for the user.
    pub fn message(&self) -> String {
        match self {
            Self::Refreshed { error: None } => "Rules refreshed".into(),
            Self::Refreshed { error: Some(e) } => format!("Failed to load rules: {e}"),
            Self::NodesLoaded { count } => format!("{count} node(s) registered"),
            Self::Mutation(report) => mutation_message(report),
            Self::Batch(report) if report.is_success() => format!(
                "All {} rule(s) added, service restarted",
                report.added.len()
            ),
            Self::Batch(report) => format!(
                "Batch finished, {} added. Failures:\n{}",
                report.added.len(),
                report.messages().join("\n")
            ),
            Self::Controlled { action } => format!("Service {}", action.past_tense()),
            Self::Status(status) => format!("Service status: {}", status.display_text()),
            Self::NodesChanged {
                count,
                change: SelectionChange::ResetToLocal,
            } => format!("Node removed ({count} left); selection reset to local"),
            Self::NodesChanged { count, .. } => format!("Node registry updated ({count} nodes)"),
            Self::NodeProbe {
                index,
                reachability,
            } => format!("Node #{index} is {reachability}"),
            Self::Failed(e) => e.to_string(),
        }
    }
}

fn mutation_message(report: &MutationReport) -> String {
    let verb = match report.mutation {
        RuleMutation::Add(_) => "added",
        RuleMutation::Delete { .. } => "deleted",
    };
    match (report.trail.contains(&MutationState::RestartFailed), &report.error) {
        (_, Some(e)) if report.state() == MutationState::MutationFailed => e.to_string(),
        (true, Some(e)) => format!("Rule {verb}, but {e}"),
        _ => format!("Rule {verb}, service restarted"),
    }
}

// ── Controller ───────────────────────────────────────────────────

/// Cheaply cloneable handle over one panel connection.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    orchestrator: Orchestrator,
    service: ServiceControl,
    registry: NodeRegistry,
}

impl Controller {
    /// Build the HTTP client described by `config`. Nothing is sent yet.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        let client = PanelClient::new(config.panel_url.clone(), &config.transport())?;
        Ok(Self::with_client(config, client))
    }

    /// Use an already-built client (tests point this at a mock server).
    pub fn with_client(config: ControllerConfig, client: PanelClient) -> Self {
        let service = ServiceControl::new(client.clone());
        Self {
            inner: Arc::new(ControllerInner {
                config,
                orchestrator: Orchestrator::new(RuleStore::new(client.clone()), service.clone()),
                service,
                registry: NodeRegistry::new(client),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Blank state with the configured page size.
    pub fn initial_state(&self, selection: Selection) -> ControllerState {
        ControllerState::new(selection, self.inner.config.page_size)
    }

    /// Load nodes, validate `selection` and fetch the first view.
    ///
    /// A panel without node management simply has no nodes.
    pub async fn bootstrap(&self, selection: Selection) -> (ControllerState, Outcome) {
        let mut state = self.initial_state(selection);
        match self.inner.registry.list().await {
            Ok(nodes) => state.nodes = nodes,
            Err(e) => debug!(error = %e, "node registry unavailable"),
        }

        match state.target() {
            Ok(target) => {
                let error = self.refresh_view(&mut state, target).await;
                (state, Outcome::Refreshed { error })
            }
            Err(e) => {
                warn!(error = %e, "configured node does not exist, using local");
                state.reset_to_local();
                self.refresh_view(&mut state, Target::Local).await;
                (state, Outcome::Failed(e))
            }
        }
    }

    /// Current status of `target`. Used by the background poller.
    pub async fn service_status(&self, target: Target) -> Result<ServiceStatus, CoreError> {
        self.inner.service.status(target).await
    }

    /// Apply `intent` to `state`.
    ///
    /// A selection that no longer matches the node snapshot falls back to
    /// local first. Reads then proceed against local; mutations and service
    /// control are refused with `InvalidTarget`.
    pub async fn handle(&self, mut state: ControllerState, intent: Intent) -> (ControllerState, Outcome) {
        debug!(?intent, selection = ?state.selection, "handling intent");
        match intent {
            Intent::LoadNodes => return self.load_nodes(state).await,
            Intent::SelectTarget(selection) => return self.select_target(state, selection).await,
            Intent::AddNode(draft) => return self.add_node(state, draft).await,
            Intent::RemoveNode(index) => return self.remove_node(state, index).await,
            Intent::TestNode(index) => {
                let outcome = match self.inner.registry.test(index, state.nodes.len()).await {
                    Ok(reachability) => Outcome::NodeProbe {
                        index,
                        reachability,
                    },
                    Err(e) => Outcome::Failed(e),
                };
                return (state, outcome);
            }
            _ => {}
        }

        let target = match state.target() {
            Ok(target) => target,
            Err(e) => {
                warn!(error = %e, "selected node no longer exists, falling back to local");
                state.reset_to_local();
                if intent.is_mutating() {
                    self.refresh_view(&mut state, Target::Local).await;
                    return (state, Outcome::Failed(e));
                }
                Target::Local
            }
        };

        self.dispatch(state, target, intent).await
    }

    async fn dispatch(
        &self,
        mut state: ControllerState,
        target: Target,
        intent: Intent,
    ) -> (ControllerState, Outcome) {
        let outcome = match intent {
            Intent::Refresh => {
                let error = self.refresh_view(&mut state, target).await;
                Outcome::Refreshed { error }
            }
            Intent::GoToPage(page) => {
                state.page = state.page.with_page(page);
                let error = self.reload_rules(&mut state, target).await;
                Outcome::Refreshed { error }
            }
            Intent::NextPage if state.page.has_next() => {
                state.page = state.page.with_page(state.page.page + 1);
                let error = self.reload_rules(&mut state, target).await;
                Outcome::Refreshed { error }
            }
            Intent::PrevPage if state.page.has_prev() => {
                state.page = state.page.with_page(state.page.page - 1);
                let error = self.reload_rules(&mut state, target).await;
                Outcome::Refreshed { error }
            }
            Intent::NextPage | Intent::PrevPage => Outcome::Refreshed { error: None },
            Intent::SetPageSize(size) => {
                state.page = Page::new(1, size);
                let error = self.reload_rules(&mut state, target).await;
                Outcome::Refreshed { error }
            }
            Intent::AddRule {
                local_port,
                remote_host,
                remote_port,
            } => {
                let (port, host, rport) = (local_port.trim(), remote_host.trim(), remote_port.trim());
                if port.is_empty() || host.is_empty() || rport.is_empty() {
                    Outcome::Failed(CoreError::Validation {
                        message: "local port, remote host and remote port are all required".into(),
                    })
                } else {
                    let rule = Rule::forward(port, format!("{host}:{rport}"));
                    self.mutate(&mut state, target, RuleMutation::Add(rule)).await
                }
            }
            Intent::DeleteRule { listen } => {
                self.mutate(&mut state, target, RuleMutation::Delete { listen })
                    .await
            }
            Intent::BatchAdd { text } => {
                match self
                    .inner
                    .orchestrator
                    .apply_batch(target, &text, &state.rules, state.page)
                    .await
                {
                    Ok(report) => {
                        state.rules.clone_from(&report.refresh.listing.rules);
                        state.page = report.refresh.listing.page;
                        self.reload_status(&mut state, target).await;
                        Outcome::Batch(report)
                    }
                    Err(e) => Outcome::Failed(e),
                }
            }
            Intent::Control(action) => match self.inner.service.control(target, action).await {
                Ok(()) => {
                    self.reload_status(&mut state, target).await;
                    Outcome::Controlled { action }
                }
                Err(e) => Outcome::Failed(e),
            },
            Intent::CheckStatus => match self.inner.service.status(target).await {
                Ok(status) => {
                    state.status = status.clone();
                    Outcome::Status(status)
                }
                Err(e) => {
                    state.status = ServiceStatus::Unknown;
                    Outcome::Failed(e)
                }
            },
            Intent::LoadNodes
            | Intent::SelectTarget(_)
            | Intent::AddNode(_)
            | Intent::RemoveNode(_)
            | Intent::TestNode(_) => unreachable!("handled before target resolution"),
        };
        (state, outcome)
    }

    async fn mutate(
        &self,
        state: &mut ControllerState,
        target: Target,
        mutation: RuleMutation,
    ) -> Outcome {
        let report = self
            .inner
            .orchestrator
            .apply_single(target, mutation, &state.rules, state.page)
            .await;
        if let Some(refresh) = &report.refresh {
            state.rules.clone_from(&refresh.listing.rules);
            state.page = refresh.listing.page;
            self.reload_status(state, target).await;
        }
        Outcome::Mutation(report)
    }

    // ── Node registry ────────────────────────────────────────────

    async fn load_nodes(&self, mut state: ControllerState) -> (ControllerState, Outcome) {
        let nodes = match self.inner.registry.list().await {
            Ok(nodes) => nodes,
            Err(e) => return (state, Outcome::Failed(e)),
        };
        state.nodes = nodes;
        if state.selection.clamp_to(state.nodes.len()) != state.selection {
            warn!(selection = ?state.selection, "selected node vanished, falling back to local");
            state.reset_to_local();
            self.refresh_view(&mut state, Target::Local).await;
        }
        let count = state.nodes.len();
        (state, Outcome::NodesLoaded { count })
    }

    async fn select_target(
        &self,
        mut state: ControllerState,
        selection: Selection,
    ) -> (ControllerState, Outcome) {
        match Target::resolve(selection, state.nodes.len()) {
            Ok(target) => {
                state.selection = target.selection();
                state.page = state.page.with_page(1);
                let error = self.refresh_view(&mut state, target).await;
                (state, Outcome::Refreshed { error })
            }
            Err(e) => {
                warn!(error = %e, "cannot select node, falling back to local");
                state.reset_to_local();
                self.refresh_view(&mut state, Target::Local).await;
                (state, Outcome::Failed(e))
            }
        }
    }

    async fn add_node(&self, mut state: ControllerState, draft: NodeDraft) -> (ControllerState, Outcome) {
        match self.inner.registry.add(draft).await {
            Ok(nodes) => {
                state.nodes = nodes;
                state.selection = state.selection.clamp_to(state.nodes.len());
                let count = state.nodes.len();
                (
                    state,
                    Outcome::NodesChanged {
                        count,
                        change: SelectionChange::Unchanged,
                    },
                )
            }
            Err(e) => (state, Outcome::Failed(e)),
        }
    }

    /// Remove a node and keep the held selection pointing at the same node.
    async fn remove_node(&self, mut state: ControllerState, index: usize) -> (ControllerState, Outcome) {
        if index >= state.nodes.len() {
            let err = CoreError::InvalidTarget {
                index,
                nodes: state.nodes.len(),
            };
            return (state, Outcome::Failed(err));
        }

        let nodes = match self.inner.registry.remove(index).await {
            Ok(nodes) => nodes,
            Err(e) => return (state, Outcome::Failed(e)),
        };

        let change = state.selection.after_removal(index);
        state.nodes = nodes;
        state.selection = state.selection.removing(index).clamp_to(state.nodes.len());
        if change == SelectionChange::ResetToLocal {
            state.reset_to_local();
            self.refresh_view(&mut state, Target::Local).await;
        }

        let count = state.nodes.len();
        (state, Outcome::NodesChanged { count, change })
    }

    // ── View refresh ─────────────────────────────────────────────

    async fn reload_rules(&self, state: &mut ControllerState, target: Target) -> Option<CoreError> {
        let refresh = self
            .inner
            .orchestrator
            .store()
            .refresh(target, state.page)
            .await;
        state.rules = refresh.listing.rules;
        state.page = refresh.listing.page;
        refresh.error
    }

    async fn reload_status(&self, state: &mut ControllerState, target: Target) {
        state.status = self.inner.service.status_or_unknown(target).await;
    }

    /// Rules first, then status.
    async fn refresh_view(&self, state: &mut ControllerState, target: Target) -> Option<CoreError> {
        let error = self.reload_rules(state, target).await;
        self.reload_status(state, target).await;
        error
    }
}
