// ── Forwarding service client ──

use tracing::{info, warn};

use fwdctl_api::PanelClient;

use crate::error::CoreError;
use crate::model::{ServiceAction, ServiceStatus};
use crate::target::{Operation, Target};

/// Status and control of the forwarding service on a target.
#[derive(Debug, Clone)]
pub struct ServiceControl {
    client: PanelClient,
}

impl ServiceControl {
    pub fn new(client: PanelClient) -> Self {
        Self { client }
    }

    /// Interpreted status of `target`.
    pub async fn status(&self, target: Target) -> Result<ServiceStatus, CoreError> {
        let raw = self
            .client
            .service_status(&target.endpoint(&Operation::GetStatus))
            .await?;
        Ok(ServiceStatus::from_reported(&raw))
    }

    /// Like [`status`](Self::status), but a failed call reads as `Unknown`.
    pub async fn status_or_unknown(&self, target: Target) -> ServiceStatus {
        match self.status(target).await {
            Ok(status) => status,
            Err(e) => {
                warn!(on = %target, error = %e, "status check failed");
                ServiceStatus::Unknown
            }
        }
    }

    pub async fn control(&self, target: Target, action: ServiceAction) -> Result<(), CoreError> {
        self.client
            .service_control(&target.endpoint(&Operation::Control(action)))
            .await?;
        info!(on = %target, %action, "service {}", action.past_tense());
        Ok(())
    }

    /// Restart after a rule change; any failure is a `RestartFailed`.
    pub async fn restart(&self, target: Target) -> Result<(), CoreError> {
        self.control(target, ServiceAction::Restart)
            .await
            .map_err(CoreError::into_restart_error)
    }
}
