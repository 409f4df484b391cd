//! Node registry command handlers.

use secrecy::SecretString;
use serde::Serialize;
use tabled::Tabled;

use fwdctl_core::{ControllerState, Intent, Node, NodeDraft, Outcome, Selection, SelectionChange};

use crate::cli::{NodesArgs, NodesCommand};
use crate::error::CliError;
use crate::output;

use super::{Ctx, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct Indexed<'a> {
    index: usize,
    #[serde(flatten)]
    node: &'a Node,
}

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
}

impl From<&Indexed<'_>> for NodeRow {
    fn from(n: &Indexed<'_>) -> Self {
        Self {
            index: n.index,
            name: n.node.label(),
            url: n.node.url(),
        }
    }
}

fn print_nodes(ctx: &Ctx<'_>, state: &ControllerState) -> Result<(), CliError> {
    let indexed: Vec<Indexed<'_>> = state
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| Indexed { index, node })
        .collect();
    let out = output::render_list(&ctx.format, &indexed, |n| NodeRow::from(n), |n| {
        n.node.label()
    })?;
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}

/// Password from `--password-env`, else an interactive prompt.
fn read_password(env_var: Option<&str>) -> Result<SecretString, CliError> {
    let password = match env_var {
        Some(var) => std::env::var(var).map_err(|_| CliError::Validation {
            field: "password-env".into(),
            reason: format!("environment variable {var} is not set"),
        })?,
        None => rpassword::prompt_password("Node password: ").map_err(|e| {
            CliError::Validation {
                field: "password".into(),
                reason: format!("prompt failed: {e}"),
            }
        })?,
    };
    Ok(SecretString::from(password))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Ctx<'_>, args: NodesArgs) -> Result<(), CliError> {
    let global = ctx.global;
    match args.command {
        NodesCommand::List => {
            let state = registry(ctx).await?;
            print_nodes(ctx, &state)
        }

        NodesCommand::Add {
            name,
            host,
            port,
            https,
            password_env,
        } => {
            let password = read_password(password_env.as_deref())?;
            let draft = NodeDraft {
                name,
                host,
                port,
                password,
                https,
            };
            let state = registry(ctx).await?;
            let (state, outcome) = ctx.controller.handle(state, Intent::AddNode(draft)).await;
            util::check(&outcome, &state)?;
            output::notice(&outcome.message(), global.quiet);
            print_nodes(ctx, &state)
        }

        NodesCommand::Remove { index } => {
            let state = registry(ctx).await?;
            let label = state
                .nodes
                .get(index)
                .map_or_else(|| format!("#{index}"), Node::label);
            if !util::confirm(
                "nodes remove",
                &format!("Remove node #{index} ({label})? Later nodes shift down by one."),
                global.yes,
            )? {
                return Ok(());
            }
            let state = ControllerState {
                selection: ctx.selection,
                ..state
            };
            let (state, outcome) = ctx.controller.handle(state, Intent::RemoveNode(index)).await;
            util::check(&outcome, &state)?;
            output::notice(&outcome.message(), global.quiet);
            if let Outcome::NodesChanged {
                change: SelectionChange::Shifted(Selection::Remote(moved)),
                ..
            } = outcome
            {
                output::notice(
                    &format!("Selected node is now #{moved}; update --node or the profile"),
                    global.quiet,
                );
            }
            Ok(())
        }

        NodesCommand::Test { index } => {
            let state = registry(ctx).await?;
            let (state, outcome) = ctx.controller.handle(state, Intent::TestNode(index)).await;
            match outcome {
                Outcome::NodeProbe {
                    ref reachability, ..
                } if !reachability.is_reachable() => Err(CliError::ConnectionFailed {
                    url: format!("node #{index}"),
                    reason: reachability.to_string(),
                }),
                Outcome::NodeProbe { .. } => {
                    output::notice(&outcome.message(), global.quiet);
                    Ok(())
                }
                ref other => util::check(other, &state),
            }
        }
    }
}

/// Node commands always need the registry, whatever the selected target.
async fn registry(ctx: &Ctx<'_>) -> Result<ControllerState, CliError> {
    let state = ctx.controller.initial_state(Selection::Local);
    let (state, outcome) = ctx.controller.handle(state, Intent::LoadNodes).await;
    util::check(&outcome, &state)?;
    Ok(state)
}
