//! Shared helpers for command handlers.

use std::io::{self, IsTerminal, Read};
use std::path::Path;

use tracing::debug;

use fwdctl_core::{ControllerState, CoreError, Intent, Outcome, Selection, Target};

use crate::error::CliError;

use super::Ctx;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, refuses instead of guessing.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read batch text from `path`, or stdin for `None` / `-`.
pub fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p).map_err(|e| {
            CliError::Validation {
                field: "file".into(),
                reason: format!("cannot read {}: {e}", p.display()),
            }
        }),
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Load the node registry and settle on the requested target.
///
/// No rules are fetched. A panel without node management is fine as long
/// as the local host is the target.
pub async fn open(ctx: &Ctx<'_>) -> Result<ControllerState, CliError> {
    let state = ctx.controller.initial_state(Selection::Local);
    let (mut state, outcome) = ctx.controller.handle(state, Intent::LoadNodes).await;
    if let Outcome::Failed(e) = outcome {
        if ctx.selection.is_remote() {
            return Err(e.into());
        }
        debug!(error = %e, "node registry unavailable");
    }

    let target = Target::resolve(ctx.selection, state.nodes.len())?;
    state.selection = target.selection();
    Ok(state)
}

/// Turn a failed outcome into an error, naming the target where it helps.
pub fn check(outcome: &Outcome, state: &ControllerState) -> Result<(), CliError> {
    match outcome.error() {
        None => Ok(()),
        Some(e) => Err(on_target(e.clone(), state)),
    }
}

/// Map a core error, filling in the target label for port conflicts.
pub fn on_target(err: CoreError, state: &ControllerState) -> CliError {
    match err {
        CoreError::PortInUse { port } => CliError::PortInUse {
            port,
            target: state.target_label(),
        },
        other => other.into(),
    }
}
