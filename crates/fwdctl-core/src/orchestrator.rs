// ── Mutation orchestration ──
//
// Sequences a rule change on a target: mutate the store, restart the
// forwarding service so the change takes effect, then refresh the view.
// A restart failure never rolls back a mutation that already landed.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::codec::{batch_lines, parse_line};
use crate::conflict::{PortReservations, admit};
use crate::error::CoreError;
use crate::model::{Page, Rule, port_of};
use crate::rules::{RuleStore, ViewRefresh};
use crate::service::ServiceControl;
use crate::target::Target;

/// Named states of a single mutation.
///
/// `Pending → StoreMutated → (Restarted | RestartFailed) → Refreshed`, or
/// `Pending → MutationFailed` when the store refuses the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationState {
    Pending,
    StoreMutated,
    Restarted,
    RestartFailed,
    MutationFailed,
    Refreshed,
}

impl MutationState {
    /// Whether `next` may follow `self`.
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::StoreMutated | Self::MutationFailed)
                | (Self::StoreMutated, Self::Restarted | Self::RestartFailed)
                | (Self::Restarted | Self::RestartFailed, Self::Refreshed)
        )
    }
}

/// One rule change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMutation {
    Add(Rule),
    Delete { listen: String },
}

impl fmt::Display for RuleMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add(rule) => write!(f, "add {} -> {}", rule.listen, rule.remote),
            Self::Delete { listen } => write!(f, "delete {listen}"),
        }
    }
}

/// Outcome of [`Orchestrator::apply_single`].
#[derive(Debug, Clone)]
pub struct MutationReport {
    pub mutation: RuleMutation,
    /// Every state visited, starting at `Pending`.
    pub trail: Vec<MutationState>,
    /// The store error (`MutationFailed`) or the restart error (`RestartFailed`).
    pub error: Option<CoreError>,
    /// Present unless the mutation failed.
    pub refresh: Option<ViewRefresh>,
}

impl MutationReport {
    fn new(mutation: RuleMutation) -> Self {
        Self {
            mutation,
            trail: vec![MutationState::Pending],
            error: None,
            refresh: None,
        }
    }

    pub fn state(&self) -> MutationState {
        self.trail
            .last()
            .copied()
            .unwrap_or(MutationState::Pending)
    }

    /// The store accepted the change (whatever happened to the restart).
    pub fn mutated(&self) -> bool {
        self.trail.contains(&MutationState::StoreMutated)
    }

    pub fn restarted(&self) -> bool {
        self.trail.contains(&MutationState::Restarted)
    }

    /// Store mutated and service restarted.
    pub fn is_success(&self) -> bool {
        self.mutated() && self.restarted()
    }

    fn advance(&mut self, next: MutationState) {
        let current = self.state();
        debug_assert!(
            current.can_advance_to(next),
            "illegal transition {current:?} -> {next:?}"
        );
        debug!(mutation = %self.mutation, from = ?current, to = ?next, "mutation state");
        self.trail.push(next);
    }

    fn fail(mut self, error: CoreError) -> Self {
        self.advance(MutationState::MutationFailed);
        self.error = Some(error);
        self
    }
}

/// Restart step of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RestartOutcome {
    /// No line succeeded, so nothing needed restarting.
    #[default]
    NotAttempted,
    Restarted,
    Failed(CoreError),
}

/// A batch line that was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFailure {
    /// 1-based position among the non-blank lines.
    pub line_number: usize,
    pub line: String,
    pub error: CoreError,
}

impl fmt::Display for LineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            CoreError::MalformedRuleLine { .. } | CoreError::PortInUse { .. } => {
                write!(f, "line {}: {}", self.line_number, self.error)
            }
            other => write!(f, "line {} ({}): {other}", self.line_number, self.line),
        }
    }
}

/// Outcome of [`Orchestrator::apply_batch`].
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Rules the store accepted, in submission order.
    pub added: Vec<Rule>,
    /// Rejected lines, in submission order.
    pub failures: Vec<LineFailure>,
    pub restart: RestartOutcome,
    /// The single refresh issued after the batch.
    pub refresh: ViewRefresh,
}

impl BatchReport {
    /// Every line applied and the restart (if any) succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !matches!(self.restart, RestartOutcome::Failed(_))
    }

    /// Per-line failure messages followed by the restart failure, if any.
    pub fn messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = self.failures.iter().map(ToString::to_string).collect();
        if let RestartOutcome::Failed(e) = &self.restart {
            messages.push(e.to_string());
        }
        messages
    }
}

/// Drives rule mutations against one target at a time.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    store: RuleStore,
    service: ServiceControl,
}

impl Orchestrator {
    pub fn new(store: RuleStore, service: ServiceControl) -> Self {
        Self { store, service }
    }

    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    /// Apply one add or delete, restart, then refresh `page`.
    ///
    /// An add is first checked against `loaded`; a visible conflict fails
    /// without any network call. Exactly one restart follows a successful
    /// store mutation and none follows a failed one.
    pub async fn apply_single(
        &self,
        target: Target,
        mutation: RuleMutation,
        loaded: &[Rule],
        page: Page,
    ) -> MutationReport {
        let mut report = MutationReport::new(mutation.clone());

        let stored = match &mutation {
            RuleMutation::Add(rule) => match admit(rule.listen_port(), loaded).into_result() {
                Ok(()) => self.store.add(target, rule).await,
                Err(e) => Err(e),
            },
            RuleMutation::Delete { listen } => self.store.delete(target, listen).await,
        };
        if let Err(e) = stored {
            info!(on = %target, %mutation, error = %e, "mutation failed");
            return report.fail(e);
        }
        report.advance(MutationState::StoreMutated);

        match self.service.restart(target).await {
            Ok(()) => report.advance(MutationState::Restarted),
            Err(e) => {
                warn!(on = %target, %mutation, error = %e, "restart after mutation failed");
                report.advance(MutationState::RestartFailed);
                report.error = Some(e);
            }
        }

        report.refresh = Some(self.store.refresh(target, page).await);
        report.advance(MutationState::Refreshed);
        report
    }

    /// Apply every line of a batch submission.
    ///
    /// Lines are handled strictly in order and fail independently. Ports
    /// already in `loaded` and ports claimed by earlier lines are refused.
    /// If any line landed, the service is restarted once; the view is
    /// refreshed once at the end regardless.
    pub async fn apply_batch(
        &self,
        target: Target,
        text: &str,
        loaded: &[Rule],
        page: Page,
    ) -> Result<BatchReport, CoreError> {
        let lines = batch_lines(text);
        if lines.is_empty() {
            return Err(CoreError::Validation {
                message: "no rules to add".into(),
            });
        }

        let mut used = PortReservations::from_rules(loaded);
        let mut added = Vec::new();
        let mut failures = Vec::new();

        for (line_number, line) in lines {
            let fail = |error| LineFailure {
                line_number,
                line: line.to_owned(),
                error,
            };

            let parsed = match parse_line(line) {
                Ok(parsed) => parsed,
                Err(e) => {
                    failures.push(fail(e));
                    continue;
                }
            };
            if let Err(e) = used.admit(&parsed.local_port).into_result() {
                failures.push(fail(e));
                continue;
            }

            let rule = parsed.to_rule();
            match self.store.add(target, &rule).await {
                Ok(()) => {
                    used.reserve(port_of(&rule.listen));
                    added.push(rule);
                }
                Err(e) => failures.push(fail(e)),
            }
        }

        let restart = if added.is_empty() {
            RestartOutcome::NotAttempted
        } else {
            match self.service.restart(target).await {
                Ok(()) => RestartOutcome::Restarted,
                Err(e) => {
                    warn!(on = %target, error = %e, "restart after batch failed");
                    RestartOutcome::Failed(e)
                }
            }
        };

        info!(
            on = %target,
            added = added.len(),
            failed = failures.len(),
            "batch applied"
        );
        let refresh = self.store.refresh(target, page).await;

        Ok(BatchReport {
            added,
            failures,
            restart,
            refresh,
        })
    }
}
