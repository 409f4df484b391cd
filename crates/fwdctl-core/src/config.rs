// ── Runtime connection configuration ──
//
// Describes how to reach the panel. Built by the CLI from a profile and
// flags, then handed to `Controller`; core never reads config files.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use fwdctl_api::{TlsMode, TransportConfig};

use crate::model::DEFAULT_PAGE_SIZE;

/// Default interval of the background status poll.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// TLS verification strategy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed panels).
    DangerAcceptInvalid,
}

/// Configuration for talking to one panel.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Panel base URL (e.g. `http://127.0.0.1:8080`).
    pub panel_url: Url,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Initial rule page size.
    pub page_size: u32,
    pub poll_interval: Duration,
}

impl ControllerConfig {
    pub fn new(panel_url: Url) -> Self {
        Self {
            panel_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            page_size: DEFAULT_PAGE_SIZE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig::default()
            .with_timeout(self.timeout)
            .with_tls(match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            })
    }
}
