// Wire types for the panel API.
//
// The panel is loose about casing (`listen` vs `Listen`) and about whether
// `total` is present, so rule pages are decoded from `serde_json::Value`
// instead of a strict derive.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// One forwarding rule as the panel stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub listen: String,
    pub remote: String,
}

impl RuleRecord {
    /// Decode a single rule object, accepting both key casings.
    ///
    /// Returns `None` when either address is missing or empty.
    fn from_value(value: &Value) -> Option<Self> {
        let field = |lower: &str, upper: &str| {
            value
                .get(upper)
                .or_else(|| value.get(lower))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };
        Some(Self {
            listen: field("listen", "Listen")?,
            remote: field("remote", "Remote")?,
        })
    }
}

/// `GET rules?page=P&size=S` reply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RulePage {
    pub rules: Vec<RuleRecord>,
    pub total: u64,
}

impl RulePage {
    /// Parse a rules reply body.
    ///
    /// `rules` must be a list; anything else is an `InvalidResponse`.
    /// `total` falls back to the number of returned rules when missing or
    /// not a number.
    pub fn from_body(body: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.to_owned(),
        })?;

        let Some(raw_rules) = value.get("rules").and_then(Value::as_array) else {
            return Err(Error::InvalidResponse {
                message: "`rules` is not a list".into(),
            });
        };

        let total = value
            .get("total")
            .and_then(Value::as_u64)
            .unwrap_or_else(|| u64::try_from(raw_rules.len()).unwrap_or(u64::MAX));
        let rules = raw_rules.iter().filter_map(RuleRecord::from_value).collect();

        Ok(Self { rules, total })
    }
}

/// `GET status` reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusReply {
    #[serde(default)]
    pub status: Option<String>,
}

/// A registered remote node, as stored by the node registry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default)]
    pub name: String,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub https: bool,
}

impl fmt::Debug for NodeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRecord")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"[REDACTED]")
            .field("https", &self.https)
            .finish()
    }
}

/// Decode a `{ "nodes": [...] }` body.
///
/// Returns `Ok(None)` when the body carries no `nodes` list (mutation
/// replies may omit it), an error only when the body isn't JSON at all.
pub(crate) fn nodes_from_body(body: &str) -> Result<Option<Vec<NodeRecord>>, Error> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: body.to_owned(),
    })?;
    let Some(list) = value.get("nodes").and_then(Value::as_array) else {
        return Ok(None);
    };
    Ok(Some(
        list.iter()
            .filter_map(|n| serde_json::from_value(n.clone()).ok())
            .collect(),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rule_page_accepts_both_key_casings() {
        let page = RulePage::from_body(
            r#"{"rules":[{"Listen":"0.0.0.0:80","Remote":"a:1"},{"listen":"0.0.0.0:81","remote":"b:2"}],"total":7}"#,
        )
        .unwrap();
        assert_eq!(page.total, 7);
        assert_eq!(
            page.rules,
            vec![
                RuleRecord {
                    listen: "0.0.0.0:80".into(),
                    remote: "a:1".into()
                },
                RuleRecord {
                    listen: "0.0.0.0:81".into(),
                    remote: "b:2".into()
                },
            ]
        );
    }

    #[test]
    fn rule_page_drops_incomplete_rules() {
        let page =
            RulePage::from_body(r#"{"rules":[{"listen":"0.0.0.0:80"},{"listen":"x:1","remote":"y:2"}]}"#)
                .unwrap();
        assert_eq!(page.rules.len(), 1);
        assert_eq!(page.rules[0].listen, "x:1");
    }

    #[test]
    fn rule_page_total_defaults_to_len() {
        let page = RulePage::from_body(r#"{"rules":[{"listen":"x:1","remote":"y:2"}],"total":"n/a"}"#)
            .unwrap();
        assert_eq!(page.total, 1);
    }

    #[test]
    fn rule_page_rejects_non_list_rules() {
        let err = RulePage::from_body(r#"{"rules":{"listen":"x"}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse { .. }), "got {err:?}");
    }

    #[test]
    fn rule_page_rejects_non_json() {
        let err = RulePage::from_body("<html>login</html>").unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }), "got {err:?}");
    }

    #[test]
    fn node_debug_redacts_password() {
        let node = NodeRecord {
            name: "edge".into(),
            host: "10.0.0.2".into(),
            port: 8080,
            password: "hunter2".into(),
            https: false,
        };
        let dbg = format!("{node:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("REDACTED"));
    }

    #[test]
    fn nodes_body_without_list_is_none() {
        assert_eq!(nodes_from_body(r#"{"ok":true}"#).unwrap(), None);
        assert_eq!(nodes_from_body("").unwrap(), None);
    }
}
