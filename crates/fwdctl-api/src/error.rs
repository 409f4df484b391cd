use thiserror::Error;

/// Top-level error type for the `fwdctl-api` crate.
///
/// Covers every failure mode of talking to a forwarding panel: transport,
/// non-success HTTP replies, and bodies that don't match the expected shape.
/// `fwdctl-core` maps these into its own taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Panel replies ───────────────────────────────────────────────
    /// The panel answered with a non-success status code.
    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The body parsed as JSON but has the wrong shape (e.g. `rules` is not a list).
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },
}

impl Error {
    /// Returns `true` if the request never got an HTTP answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
