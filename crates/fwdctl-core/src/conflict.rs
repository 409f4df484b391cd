// ── Listen-port conflict pre-check ──
//
// Advisory only: it sees whatever rules are loaded for the target (usually
// one page), so the target's rule store still has the final say. The check
// saves a round trip for conflicts that are already visible.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::model::{Rule, port_of};

/// Admission decision for a candidate listen port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Allow,
    Reject(CoreError),
}

impl Admission {
    pub fn into_result(self) -> Result<(), CoreError> {
        match self {
            Self::Allow => Ok(()),
            Self::Reject(err) => Err(err),
        }
    }
}

/// Admit `candidate` unless an existing rule already listens on it.
pub fn admit<'a>(candidate: &str, existing: impl IntoIterator<Item = &'a Rule>) -> Admission {
    if existing.into_iter().any(|r| r.listen_port() == candidate) {
        Admission::Reject(CoreError::PortInUse {
            port: candidate.to_owned(),
        })
    } else {
        Admission::Allow
    }
}

/// Listen ports known to be taken, growing as a batch is applied.
///
/// Seeded from the loaded rules; each accepted batch line reserves its
/// port so a later line in the same submission can't claim it again.
#[derive(Debug, Clone, Default)]
pub struct PortReservations {
    used: HashSet<String>,
}

impl PortReservations {
    pub fn from_rules<'a>(rules: impl IntoIterator<Item = &'a Rule>) -> Self {
        Self {
            used: rules
                .into_iter()
                .map(|r| port_of(&r.listen).to_owned())
                .collect(),
        }
    }

    pub fn admit(&self, candidate: &str) -> Admission {
        if self.used.contains(candidate) {
            Admission::Reject(CoreError::PortInUse {
                port: candidate.to_owned(),
            })
        } else {
            Admission::Allow
        }
    }

    /// Mark `port` as taken. Returns `false` if it already was.
    pub fn reserve(&mut self, port: &str) -> bool {
        self.used.insert(port.to_owned())
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rules() -> Vec<Rule> {
        vec![
            Rule::new("0.0.0.0:8080", "a:1"),
            Rule::new("[::]:9000", "b:2"),
        ]
    }

    #[test]
    fn rejects_existing_port() {
        assert_eq!(
            admit("8080", &rules()),
            Admission::Reject(CoreError::PortInUse {
                port: "8080".into()
            })
        );
        assert_ne!(admit("9000", &rules()), Admission::Allow);
    }

    #[test]
    fn admits_free_port() {
        assert_eq!(admit("8081", &rules()), Admission::Allow);
        assert_eq!(admit("80", &Vec::<Rule>::new()), Admission::Allow);
    }

    #[test]
    fn reservation_blocks_repeat_within_batch() {
        let mut ports = PortReservations::from_rules(&rules());
        assert_eq!(ports.admit("7000"), Admission::Allow);
        assert!(ports.reserve("7000"));
        assert_ne!(ports.admit("7000"), Admission::Allow);
        assert!(!ports.reserve("7000"));
        assert_eq!(ports.len(), 3);
    }

    #[test]
    fn reject_converts_to_port_in_use() {
        let err = admit("8080", &rules()).into_result().unwrap_err();
        assert!(matches!(err, CoreError::PortInUse { ref port } if port == "8080"));
    }
}
