// ── Rule store client ──
//
// Paginated fetch, add and delete against a resolved target. The target's
// store is the only source of truth; this client holds nothing beyond the
// page it just fetched.

use tracing::{debug, info, warn};

use fwdctl_api::PanelClient;

use crate::error::CoreError;
use crate::model::{Page, Rule};
use crate::target::{Operation, Target};

/// One fetched page of rules together with the window it was fetched for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleListing {
    pub rules: Vec<Rule>,
    /// Window the rules belong to, `total` as last reported.
    pub page: Page,
}

impl RuleListing {
    /// Nothing loaded: no rules, a zero total, and the window back on page 1.
    pub fn empty(page: Page) -> Self {
        Self {
            rules: Vec::new(),
            page: page.with_total(0).clamped(),
        }
    }
}

/// Result of a view refresh. A failed fetch still yields a (blank) listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRefresh {
    pub listing: RuleListing,
    pub error: Option<CoreError>,
}

impl ViewRefresh {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Rule operations against whichever target the caller resolved.
#[derive(Debug, Clone)]
pub struct RuleStore {
    client: PanelClient,
}

impl RuleStore {
    pub fn new(client: PanelClient) -> Self {
        Self { client }
    }

    /// Fetch the rules on `page`.
    ///
    /// When the reported total puts `page` past the last page, the window is
    /// moved onto the last page and fetched again, once.
    pub async fn list(&self, target: Target, page: Page) -> Result<RuleListing, CoreError> {
        let listing = self.fetch(target, page).await?;
        if !listing.page.is_beyond_end() {
            return Ok(listing);
        }

        let clamped = listing.page.clamped();
        debug!(
            requested = page.page,
            last = clamped.page,
            "page beyond end, refetching last page"
        );
        self.fetch(target, clamped).await
    }

    async fn fetch(&self, target: Target, page: Page) -> Result<RuleListing, CoreError> {
        let endpoint = target.endpoint(&Operation::ListRules {
            page: page.page,
            size: page.size,
        });
        let reply = self.client.list_rules(&endpoint).await?;
        Ok(RuleListing {
            rules: reply.rules.into_iter().map(Rule::from).collect(),
            page: page.with_total(reply.total),
        })
    }

    /// Create `rule` on `target`. A non-success reply is a `StoreRejected`.
    pub async fn add(&self, target: Target, rule: &Rule) -> Result<(), CoreError> {
        let endpoint = target.endpoint(&Operation::AddRule);
        self.client
            .add_rule(&endpoint, &rule.to_record())
            .await
            .map_err(|e| CoreError::from(e).into_store_error())?;
        info!(on = %target, listen = %rule.listen, remote = %rule.remote, "rule added");
        Ok(())
    }

    /// Delete the rule whose listen address is exactly `listen`.
    pub async fn delete(&self, target: Target, listen: &str) -> Result<(), CoreError> {
        let endpoint = target.endpoint(&Operation::DeleteRule {
            listen: listen.to_owned(),
        });
        self.client
            .delete_rule(&endpoint)
            .await
            .map_err(|e| CoreError::from(e).into_store_error())?;
        info!(on = %target, listen, "rule deleted");
        Ok(())
    }

    /// Re-fetch `page` for display. Errors leave an empty listing behind.
    pub async fn refresh(&self, target: Target, page: Page) -> ViewRefresh {
        match self.list(target, page).await {
            Ok(listing) => ViewRefresh {
                listing,
                error: None,
            },
            Err(e) => {
                warn!(on = %target, error = %e, "rule refresh failed");
                ViewRefresh {
                    listing: RuleListing::empty(page),
                    error: Some(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_listing_never_keeps_a_dead_page() {
        let listing = RuleListing::empty(Page::new(3, 10).with_total(40));
        assert!(listing.rules.is_empty());
        assert_eq!(listing.page, Page::new(1, 10));
    }
}
