//! Clap derive structures for the `fwdctl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fwdctl -- manage port-forwarding rules on a panel and its nodes
#[derive(Debug, Parser)]
#[command(
    name = "fwdctl",
    version,
    about = "Manage port-forwarding rules and nodes from the command line",
    long_about = "Manage TCP port-forwarding rules on a forwarding panel.\n\n\
        Rules live on the panel's own host or on any registered remote node;\n\
        every change restarts the forwarding service so it takes effect.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Panel profile to use
    #[arg(long, short = 'p', env = "FWDCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Panel URL (overrides profile)
    #[arg(long, env = "FWDCTL_PANEL", global = true)]
    pub panel: Option<String>,

    /// Operate on remote node N instead of the panel host
    #[arg(long, short = 'n', global = true, conflicts_with = "local")]
    pub node: Option<usize>,

    /// Operate on the panel host even if the profile selects a node
    #[arg(long, global = true)]
    pub local: bool,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "FWDCTL_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "FWDCTL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "FWDCTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Rules per page
    #[arg(long, global = true)]
    pub page_size: Option<u32>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage forwarding rules on the selected target
    #[command(alias = "r")]
    Rules(RulesArgs),

    /// Inspect and control the forwarding service
    #[command(alias = "svc")]
    Service(ServiceArgs),

    /// Manage the remote node registry
    Nodes(NodesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Rules ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// List one page of rules
    #[command(alias = "ls")]
    List {
        /// Page number (1-based); clamped to the last page
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Add a rule listening on 0.0.0.0:<LOCAL_PORT>
    Add {
        local_port: String,
        remote_host: String,
        remote_port: String,
    },

    /// Delete the rule with this exact listen address
    #[command(alias = "rm")]
    Delete {
        /// Listen address as listed (e.g. 0.0.0.0:8080)
        listen: String,
    },

    /// Add many rules, one per line ("port,host,port" or "port:host:port")
    Batch {
        /// File to read; "-" or omitted reads stdin
        file: Option<PathBuf>,
    },
}

// ── Service ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServiceArgs {
    #[command(subcommand)]
    pub command: ServiceCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServiceCommand {
    /// Show the forwarding service status
    Status,
    /// Start the forwarding service
    Start,
    /// Stop the forwarding service
    Stop,
    /// Restart the forwarding service
    Restart,
    /// Poll the status until interrupted
    Watch {
        /// Poll interval (e.g. "15s", "1m") [default: from config]
        #[arg(long, short = 'i', value_parser = humantime::parse_duration)]
        interval: Option<Duration>,
    },
}

// ── Nodes ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NodesArgs {
    #[command(subcommand)]
    pub command: NodesCommand,
}

#[derive(Debug, Subcommand)]
pub enum NodesCommand {
    /// List registered nodes
    #[command(alias = "ls")]
    List,

    /// Register a node (prompts for the password)
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        host: String,
        /// Management port [default: 8080]
        #[arg(long)]
        port: Option<u16>,
        /// Talk to the node over HTTPS
        #[arg(long)]
        https: bool,
        /// Read the password from this environment variable instead of prompting
        #[arg(long, value_name = "VAR")]
        password_env: Option<String>,
    },

    /// Remove node N (later nodes shift down by one)
    #[command(alias = "rm")]
    Remove { index: usize },

    /// Check whether node N answers
    Test { index: usize },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration
    Show,

    /// Set the default profile
    Use { name: String },

    /// List configured profiles
    Profiles,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
