// ── Forwarding service status and control ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Status strings the forwarding service reports while running
/// ("enabled" and "running").
pub const RUNNING_STATUSES: [&str; 2] = ["启用", "运行中"];

/// Interpreted service status of one target.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ServiceStatus {
    Running,
    /// Anything other than a running status; `reported` is the raw string.
    Stopped { reported: String },
    /// The status call itself failed.
    #[default]
    Unknown,
}

impl ServiceStatus {
    /// Interpret a raw status string.
    pub fn from_reported(raw: &str) -> Self {
        if RUNNING_STATUSES.contains(&raw) {
            Self::Running
        } else {
            Self::Stopped {
                reported: raw.to_owned(),
            }
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Short human-readable status.
    pub fn display_text(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Stopped { reported } if !reported.is_empty() => reported,
            Self::Stopped { .. } => "stopped",
            Self::Unknown => "unknown",
        }
    }
}

/// Control actions accepted by the forwarding service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
}

impl ServiceAction {
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Start => "started",
            Self::Stop => "stopped",
            Self::Restart => "restarted",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn recognizes_both_running_strings() {
        for raw in RUNNING_STATUSES {
            assert!(ServiceStatus::from_reported(raw).is_running());
        }
    }

    #[test]
    fn anything_else_is_stopped() {
        let status = ServiceStatus::from_reported("已停止");
        assert!(!status.is_running());
        assert_eq!(status.display_text(), "已停止");
        assert_eq!(ServiceStatus::from_reported("").display_text(), "stopped");
        assert_eq!(ServiceStatus::Unknown.display_text(), "unknown");
    }

    #[test]
    fn action_round_trips_through_strings() {
        assert_eq!(ServiceAction::Restart.to_string(), "restart");
        assert_eq!(ServiceAction::from_str("stop").unwrap(), ServiceAction::Stop);
        assert_eq!(ServiceAction::Start.as_ref(), "start");
    }
}
