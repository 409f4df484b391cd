// ── Core error types ──
//
// The controller's failure taxonomy. Consumers never see HTTP status codes
// or JSON parse failures directly: the `From<fwdctl_api::Error>` impl
// translates transport-layer errors into these variants, and call sites
// that know more (a rejected store write vs. a rejected restart) map them
// explicitly.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("Malformed rule line: {line}")]
    MalformedRuleLine { line: String },

    #[error("Port {port} is already in use")]
    PortInUse { port: String },

    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── Target errors ────────────────────────────────────────────────
    #[error("Node #{index} does not exist ({nodes} registered)")]
    InvalidTarget { index: usize, nodes: usize },

    // ── Remote errors ────────────────────────────────────────────────
    #[error("Rule store rejected the change: {message}")]
    StoreRejected { message: String },

    #[error("Invalid server response: {message}")]
    InvalidServerResponse { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Service restart failed: {message}")]
    RestartFailed { message: String },

    #[error("Operation rejected by panel: {message}")]
    Rejected { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Re-label a rejected write as a store rejection.
    pub(crate) fn into_store_error(self) -> Self {
        match self {
            Self::Rejected { message } | Self::InvalidServerResponse { message } => {
                Self::StoreRejected { message }
            }
            other => other,
        }
    }

    /// Re-label any failure of a restart call.
    pub(crate) fn into_restart_error(self) -> Self {
        match self {
            Self::RestartFailed { .. } => self,
            other => Self::RestartFailed {
                message: other.to_string(),
            },
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fwdctl_api::Error> for CoreError {
    fn from(err: fwdctl_api::Error) -> Self {
        match err {
            fwdctl_api::Error::Transport(e) => CoreError::Transport {
                message: e.to_string(),
            },
            fwdctl_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            fwdctl_api::Error::Tls(message) => CoreError::Config { message },
            fwdctl_api::Error::Rejected { status, message } => CoreError::Rejected {
                message: format!("HTTP {status}: {message}"),
            },
            fwdctl_api::Error::Deserialization { message, body: _ }
            | fwdctl_api::Error::InvalidResponse { message } => {
                CoreError::InvalidServerResponse { message }
            }
        }
    }
}
