// ── Background status poll ──
//
// Re-checks the service status of one target on a fixed interval and
// publishes it on a watch channel. It races with user-triggered refreshes;
// whichever finishes last is what the display shows.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::controller::Controller;
use crate::model::ServiceStatus;
use crate::target::Target;

/// Handle to a running status poll.
pub struct StatusPoller {
    target: watch::Sender<Target>,
    status: watch::Receiver<ServiceStatus>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl StatusPoller {
    /// Start polling `target` every `interval`.
    ///
    /// The first check happens one interval after spawning. Cancelling
    /// `cancel` (or calling [`shutdown`](Self::shutdown)) stops the loop.
    pub fn spawn(
        controller: Controller,
        target: Target,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        let (target_tx, target_rx) = watch::channel(target);
        let (status_tx, status_rx) = watch::channel(ServiceStatus::Unknown);
        let handle = tokio::spawn(poll_task(
            controller,
            target_rx,
            status_tx,
            interval,
            cancel.clone(),
        ));
        Self {
            target: target_tx,
            status: status_rx,
            cancel,
            handle,
        }
    }

    /// Poll a different target from the next tick on.
    pub fn retarget(&self, target: Target) {
        self.target.send_replace(target);
    }

    pub fn subscribe(&self) -> watch::Receiver<ServiceStatus> {
        self.status.clone()
    }

    /// Most recently published status.
    pub fn latest(&self) -> ServiceStatus {
        self.status.borrow().clone()
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "status poller task ended abnormally");
        }
    }
}

async fn poll_task(
    controller: Controller,
    target: watch::Receiver<Target>,
    status: watch::Sender<ServiceStatus>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let current = *target.borrow();
                let next = match controller.service_status(current).await {
                    Ok(s) => s,
                    Err(e) => {
                        warn!(on = %current, error = %e, "status poll failed");
                        ServiceStatus::Unknown
                    }
                };
                debug!(on = %current, status = next.display_text(), "status poll");
                status.send_replace(next);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use fwdctl_api::PanelClient;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn controller_for(url: Url) -> Controller {
        Controller::with_client(
            ControllerConfig::new(url.clone()),
            PanelClient::with_client(reqwest::Client::new(), url),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_before_first_tick() {
        // Nothing listens here; the poller must exit without ever calling it.
        let controller = controller_for(Url::parse("http://127.0.0.1:1").unwrap());
        let poller = StatusPoller::spawn(
            controller,
            Target::Local,
            Duration::from_secs(15),
            CancellationToken::new(),
        );
        assert_eq!(poller.latest(), ServiceStatus::Unknown);
        poller.shutdown().await;
    }

    #[tokio::test]
    async fn ticks_publish_status_and_follow_retarget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/check_status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "运行中" })))
            .expect(1..)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/nodes/0/status"))
            .respond_with(ResponseTemplate::new(502).set_body_string("node offline"))
            .expect(1..)
            .mount(&server)
            .await;

        let controller = controller_for(Url::parse(&server.uri()).unwrap());
        let poller = StatusPoller::spawn(
            controller,
            Target::Local,
            Duration::from_millis(20),
            CancellationToken::new(),
        );
        let mut rx = poller.subscribe();
        let wait = Duration::from_secs(5);

        tokio::time::timeout(wait, rx.wait_for(ServiceStatus::is_running))
            .await
            .unwrap()
            .unwrap();

        // A failing node status call publishes Unknown.
        poller.retarget(Target::Remote(0));
        tokio::time::timeout(wait, rx.wait_for(|s| *s == ServiceStatus::Unknown))
            .await
            .unwrap()
            .unwrap();

        poller.shutdown().await;
    }
}
