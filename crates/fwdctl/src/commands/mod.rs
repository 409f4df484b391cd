//! Command dispatch: bridges CLI args -> controller intents -> output formatting.

pub mod config_cmd;
pub mod nodes;
pub mod rules;
pub mod service;
pub mod util;

use fwdctl_core::{Controller, Selection};

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// What every panel-bound handler gets.
pub struct Ctx<'a> {
    pub controller: Controller,
    /// Target requested by flags or profile, not yet validated.
    pub selection: Selection,
    pub format: OutputFormat,
    pub global: &'a GlobalOpts,
}

/// Dispatch a panel-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Ctx<'_>) -> Result<(), CliError> {
    match cmd {
        Command::Rules(args) => rules::handle(ctx, args).await,
        Command::Service(args) => service::handle(ctx, args).await,
        Command::Nodes(args) => nodes::handle(ctx, args).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
