//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use fwdctl_config::ConfigError;
use fwdctl_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    /// Some of the work landed, some did not.
    pub const PARTIAL: i32 = 9;
}

const UNNAMED_PANEL: &str = "(panel)";

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the panel at {url}")]
    #[diagnostic(
        code(fwdctl::connection_failed),
        help(
            "Check that the panel is running and accessible.\n\
             Reason: {reason}\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(fwdctl::not_found),
        help("Run: fwdctl {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Port {port} is already in use on {target}")]
    #[diagnostic(
        code(fwdctl::port_in_use),
        help("Pick another local port, or delete the existing rule first.")
    )]
    PortInUse { port: String, target: String },

    // ── Panel ────────────────────────────────────────────────────────
    #[error("Panel error ({code}): {message}")]
    #[diagnostic(code(fwdctl::panel_error))]
    PanelError { code: String, message: String },

    #[error("{summary}")]
    #[diagnostic(
        code(fwdctl::partial_failure),
        help("{details}\nRe-run `fwdctl rules list` to see what is in place.")
    )]
    PartialFailure { summary: String, details: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fwdctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(fwdctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: fwdctl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No panel configured")]
    #[diagnostic(
        code(fwdctl::no_config),
        help(
            "Create a profile with: fwdctl config init\n\
             Or pass --panel <URL>. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(fwdctl::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(fwdctl::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(fwdctl::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::PortInUse { .. } => exit_code::CONFLICT,
            Self::PartialFailure { .. } => exit_code::PARTIAL,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the panel URL to a connection failure that names no endpoint.
    pub fn at_panel(self, panel: &url::Url) -> Self {
        match self {
            Self::ConnectionFailed { url, reason } if url == UNNAMED_PANEL => Self::ConnectionFailed {
                url: panel.to_string(),
                reason,
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Transport { message } => CliError::ConnectionFailed {
                url: UNNAMED_PANEL.into(),
                reason: message,
            },

            CoreError::InvalidTarget { index, nodes: _ } => CliError::NotFound {
                resource_type: "node".into(),
                identifier: format!("#{index}"),
                list_command: "nodes list".into(),
            },

            CoreError::PortInUse { port } => CliError::PortInUse {
                port,
                target: "the selected target".into(),
            },

            CoreError::MalformedRuleLine { line } => CliError::Validation {
                field: "rule".into(),
                reason: format!("malformed rule line: {line}"),
            },

            CoreError::MissingField { field } => CliError::Validation {
                field: field.into(),
                reason: "must not be empty".into(),
            },

            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::StoreRejected { message } => CliError::PanelError {
                code: "store_rejected".into(),
                message,
            },

            CoreError::Rejected { message } => CliError::PanelError {
                code: "rejected".into(),
                message,
            },

            CoreError::RestartFailed { message } => CliError::PanelError {
                code: "restart_failed".into(),
                message,
            },

            CoreError::InvalidServerResponse { message } => CliError::PanelError {
                code: "invalid_response".into(),
                message,
            },

            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
