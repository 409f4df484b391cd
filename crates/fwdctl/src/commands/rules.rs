//! Rule command handlers.

use serde::Serialize;
use tabled::Tabled;

use fwdctl_core::{
    BatchReport, ControllerState, Intent, MutationReport, MutationState, Outcome, Rule,
};

use crate::cli::{OutputFormat, RulesArgs, RulesCommand};
use crate::error::CliError;
use crate::output;

use super::{Ctx, util};

// ── Table row ───────────────────────────────────────────────────────

/// A rule as listed: its position in the full set plus the rule itself.
#[derive(Serialize)]
struct Listed<'a> {
    number: u64,
    #[serde(flatten)]
    rule: &'a Rule,
}

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "#")]
    number: u64,
    #[tabled(rename = "Listen")]
    listen: String,
    #[tabled(rename = "Local Port")]
    local_port: String,
    #[tabled(rename = "Remote Host")]
    remote_host: String,
    #[tabled(rename = "Remote Port")]
    remote_port: String,
}

impl From<&Listed<'_>> for RuleRow {
    fn from(l: &Listed<'_>) -> Self {
        Self {
            number: l.number,
            listen: l.rule.listen.clone(),
            local_port: l.rule.listen_port().to_owned(),
            remote_host: l.rule.remote_host().to_owned(),
            remote_port: l.rule.remote_port().to_owned(),
        }
    }
}

fn footer(state: &ControllerState, color: bool) -> String {
    format!(
        "Page {}/{}, {} rule(s) on {}, service {}",
        state.page.page,
        state.page.total_pages(),
        state.page.total,
        state.target_label(),
        output::paint_status(&state.status, color),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Ctx<'_>, args: RulesArgs) -> Result<(), CliError> {
    let global = ctx.global;
    match args.command {
        RulesCommand::List { page } => {
            let state = util::open(ctx).await?;
            let (state, outcome) = ctx.controller.handle(state, Intent::GoToPage(page)).await;
            util::check(&outcome, &state)?;
            let (state, _) = ctx.controller.handle(state, Intent::CheckStatus).await;

            let listed: Vec<Listed<'_>> = state
                .rules
                .iter()
                .enumerate()
                .map(|(i, rule)| Listed {
                    number: state.page.row_number(i),
                    rule,
                })
                .collect();
            let out = output::render_list(&ctx.format, &listed, |l| RuleRow::from(l), |l| {
                l.rule.listen.clone()
            })?;
            output::print_output(&out, global.quiet);
            if matches!(ctx.format, OutputFormat::Table) {
                output::notice(&footer(&state, output::should_color(&global.color)), global.quiet);
            }
            Ok(())
        }

        RulesCommand::Add {
            local_port,
            remote_host,
            remote_port,
        } => {
            let state = loaded(ctx).await?;
            let (state, outcome) = ctx
                .controller
                .handle(
                    state,
                    Intent::AddRule {
                        local_port,
                        remote_host,
                        remote_port,
                    },
                )
                .await;
            finish_mutation(ctx, &state, &outcome)
        }

        RulesCommand::Delete { listen } => {
            if !util::confirm(
                "rules delete",
                &format!("Delete rule {listen}?"),
                global.yes,
            )? {
                return Ok(());
            }
            let state = loaded(ctx).await?;
            let (state, outcome) = ctx
                .controller
                .handle(state, Intent::DeleteRule { listen })
                .await;
            finish_mutation(ctx, &state, &outcome)
        }

        RulesCommand::Batch { file } => {
            let text = util::read_input(file.as_deref())?;
            let state = loaded(ctx).await?;
            let (state, outcome) = ctx.controller.handle(state, Intent::BatchAdd { text }).await;
            match outcome {
                Outcome::Batch(ref report) => finish_batch(ctx, report, &outcome),
                _ => util::check(&outcome, &state),
            }
        }
    }
}

/// Open the target and load its first page, which mutations check against.
async fn loaded(ctx: &Ctx<'_>) -> Result<ControllerState, CliError> {
    let state = util::open(ctx).await?;
    let (state, outcome) = ctx.controller.handle(state, Intent::Refresh).await;
    util::check(&outcome, &state)?;
    Ok(state)
}

fn finish_mutation(
    ctx: &Ctx<'_>,
    state: &ControllerState,
    outcome: &Outcome,
) -> Result<(), CliError> {
    let Outcome::Mutation(report) = outcome else {
        return util::check(outcome, state);
    };
    match report.state() {
        MutationState::MutationFailed => util::check(outcome, state),
        _ if report.is_success() => {
            output::notice(&outcome.message(), ctx.global.quiet);
            Ok(())
        }
        _ => Err(restart_failure(report, outcome)),
    }
}

fn restart_failure(report: &MutationReport, outcome: &Outcome) -> CliError {
    CliError::PartialFailure {
        summary: outcome.message(),
        details: format!(
            "The change ({}) is stored but not active until the service restarts.\n\
             Try: fwdctl service restart",
            report.mutation
        ),
    }
}

fn finish_batch(ctx: &Ctx<'_>, report: &BatchReport, outcome: &Outcome) -> Result<(), CliError> {
    if report.is_success() {
        output::notice(&outcome.message(), ctx.global.quiet);
        return Ok(());
    }
    let summary = format!(
        "{} rule(s) added, {} line(s) failed",
        report.added.len(),
        report.failures.len()
    );
    Err(CliError::PartialFailure {
        summary,
        details: report.messages().join("\n"),
    })
}
