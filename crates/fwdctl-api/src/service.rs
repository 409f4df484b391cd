// Forwarding service endpoints: status and start/stop/restart.

use crate::client::PanelClient;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::models::StatusReply;

impl PanelClient {
    /// Fetch the raw status string reported by the forwarding service.
    ///
    /// A missing `status` field yields an empty string.
    pub async fn service_status(&self, endpoint: &Endpoint) -> Result<String, Error> {
        let body = self.send(endpoint).await?;
        let reply: StatusReply =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;
        Ok(reply.status.unwrap_or_default())
    }

    /// Issue a control action (start, stop or restart).
    ///
    /// Success is the HTTP status alone; the reply body is ignored.
    pub async fn service_control(&self, endpoint: &Endpoint) -> Result<(), Error> {
        self.send(endpoint).await?;
        Ok(())
    }
}
