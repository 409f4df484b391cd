//! Service command handlers.

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use fwdctl_core::{Intent, Outcome, ServiceAction, ServiceStatus, StatusPoller};

use crate::cli::{ServiceArgs, ServiceCommand};
use crate::error::CliError;
use crate::output;

use super::{Ctx, util};

#[derive(Serialize)]
struct StatusView<'a> {
    target: String,
    #[serde(flatten)]
    status: &'a ServiceStatus,
}

fn detail(v: &StatusView<'_>, color: bool) -> String {
    [
        format!("Target:  {}", v.target),
        format!("Status:  {}", output::paint_status(v.status, color)),
    ]
    .join("\n")
}

pub async fn handle(ctx: &Ctx<'_>, args: ServiceArgs) -> Result<(), CliError> {
    let global = ctx.global;
    let color = output::should_color(&global.color);
    let action = match args.command {
        ServiceCommand::Status => {
            let state = util::open(ctx).await?;
            let (state, outcome) = ctx.controller.handle(state, Intent::CheckStatus).await;
            util::check(&outcome, &state)?;

            let view = StatusView {
                target: state.target_label(),
                status: &state.status,
            };
            let out = output::render_single(
                &ctx.format,
                &view,
                |v| detail(v, color),
                |v| v.status.display_text().to_owned(),
            )?;
            output::print_output(&out, global.quiet);
            return Ok(());
        }
        ServiceCommand::Watch { interval } => return watch(ctx, interval).await,
        ServiceCommand::Start => ServiceAction::Start,
        ServiceCommand::Stop => ServiceAction::Stop,
        ServiceCommand::Restart => ServiceAction::Restart,
    };

    if action == ServiceAction::Stop
        && !util::confirm(
            "service stop",
            "Stop the forwarding service? All rules stop forwarding.",
            global.yes,
        )?
    {
        return Ok(());
    }

    let state = util::open(ctx).await?;
    let (state, outcome) = ctx.controller.handle(state, Intent::Control(action)).await;
    util::check(&outcome, &state)?;
    if let Outcome::Controlled { .. } = outcome {
        output::notice(
            &format!(
                "{} on {} (now {})",
                outcome.message(),
                state.target_label(),
                output::paint_status(&state.status, color)
            ),
            global.quiet,
        );
    }
    Ok(())
}

/// Print every status change until Ctrl-C.
async fn watch(ctx: &Ctx<'_>, interval: Option<std::time::Duration>) -> Result<(), CliError> {
    let global = ctx.global;
    let color = output::should_color(&global.color);
    let state = util::open(ctx).await?;
    let target = state.target()?;
    let interval = interval.unwrap_or(ctx.controller.config().poll_interval);

    let (state, _) = ctx.controller.handle(state, Intent::CheckStatus).await;
    let label = state.target_label();
    output::print_output(
        &format!("{label}: {}", output::paint_status(&state.status, color)),
        global.quiet,
    );

    let poller = StatusPoller::spawn(
        ctx.controller.clone(),
        target,
        interval,
        CancellationToken::new(),
    );
    let mut updates = poller.subscribe();
    let mut last = state.status;

    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = updates.borrow_and_update().clone();
                if status != last {
                    output::print_output(
                        &format!("{label}: {}", output::paint_status(&status, color)),
                        global.quiet,
                    );
                    last = status;
                }
            }
        }
    }

    poller.shutdown().await;
    Ok(())
}
