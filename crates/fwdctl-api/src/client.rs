// Panel HTTP client
//
// Wraps `reqwest::Client` with URL construction from `Endpoint`s and
// status-code handling. Rule, service and node endpoints are implemented
// as inherent methods in separate files to keep this module focused on
// transport mechanics.

use reqwest::RequestBuilder;
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Longest slice of an error body carried into `Error::Rejected`.
const BODY_PREVIEW_LEN: usize = 200;

/// Raw HTTP client for one forwarding panel.
///
/// The panel serves its own rule store and service controls, and proxies
/// rule/status/control calls for registered nodes under `/api/nodes/{i}/`.
/// All node traffic therefore goes through this single base URL.
#[derive(Debug, Clone)]
pub struct PanelClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PanelClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the panel root (e.g. `http://127.0.0.1:8080`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The panel base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build the full URL for an endpoint: `{base}{path}?{query}`.
    ///
    /// A path prefix on the base URL (panel behind a reverse proxy) is kept.
    pub(crate) fn url_for(&self, endpoint: &Endpoint) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}{}", endpoint.path))?;
        if !endpoint.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &endpoint.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Start a request for `endpoint`.
    pub(crate) fn request(&self, endpoint: &Endpoint) -> Result<RequestBuilder, Error> {
        let url = self.url_for(endpoint)?;
        debug!("{} {}", endpoint.method, url);
        Ok(self.http.request(endpoint.method.as_reqwest(), url))
    }

    /// Send a bodyless request and return the response text.
    pub(crate) async fn send(&self, endpoint: &Endpoint) -> Result<String, Error> {
        self.execute(self.request(endpoint)?).await
    }

    /// Send a request with a JSON body and return the response text.
    pub(crate) async fn send_json(
        &self,
        endpoint: &Endpoint,
        body: &(impl Serialize + Sync),
    ) -> Result<String, Error> {
        self.execute(self.request(endpoint)?.json(body)).await
    }

    /// Send the request, mapping non-2xx replies to `Error::Rejected`.
    pub(crate) async fn execute(&self, builder: RequestBuilder) -> Result<String, Error> {
        let resp = builder.send().await.map_err(Error::Transport)?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_owned()
            } else {
                preview(&body).to_owned()
            };
            return Err(Error::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(len = body.len(), "response body received");
        Ok(body)
    }
}

/// First `BODY_PREVIEW_LEN` bytes of `body`, cut on a char boundary.
fn preview(body: &str) -> &str {
    if body.len() <= BODY_PREVIEW_LEN {
        return body;
    }
    let mut end = BODY_PREVIEW_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> PanelClient {
        PanelClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn url_keeps_base_path_prefix() {
        let c = client("http://panel.local:8080/fwd/");
        let url = c.url_for(&Endpoint::get("/get_rules")).unwrap();
        assert_eq!(url.as_str(), "http://panel.local:8080/fwd/get_rules");
    }

    #[test]
    fn url_encodes_query_values() {
        let c = client("http://panel.local");
        let url = c
            .url_for(&Endpoint::delete("/delete_rule").with_query("listen", "0.0.0.0:8080"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://panel.local/delete_rule?listen=0.0.0.0%3A8080"
        );
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "规".repeat(100);
        let cut = preview(&body);
        assert!(cut.len() <= BODY_PREVIEW_LEN);
        assert!(body.starts_with(cut));
    }
}
