// Rule store endpoints
//
// The caller resolves which endpoint (local panel or a node proxy path)
// to hit; these methods only execute and decode.

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use tracing::debug;

use crate::client::PanelClient;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::models::{RulePage, RuleRecord};

impl PanelClient {
    /// Fetch one page of rules.
    ///
    /// Sent with `no-cache` headers so an intermediate proxy never serves a
    /// page from before the last mutation.
    pub async fn list_rules(&self, endpoint: &Endpoint) -> Result<RulePage, Error> {
        let builder = self
            .request(endpoint)?
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache");
        let body = self.execute(builder).await?;
        let page = RulePage::from_body(&body)?;
        debug!(count = page.rules.len(), total = page.total, "fetched rule page");
        Ok(page)
    }

    /// Create a rule. The panel enforces listen-port uniqueness.
    pub async fn add_rule(&self, endpoint: &Endpoint, rule: &RuleRecord) -> Result<(), Error> {
        debug!(listen = %rule.listen, remote = %rule.remote, "adding rule");
        self.send_json(endpoint, rule).await?;
        Ok(())
    }

    /// Delete the rule identified by the `listen` query on `endpoint`.
    pub async fn delete_rule(&self, endpoint: &Endpoint) -> Result<(), Error> {
        self.send(endpoint).await?;
        Ok(())
    }
}
