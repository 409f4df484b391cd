// ── Target selection ──

use serde::Serialize;

/// Which target the user is operating on.
///
/// `Remote` holds a registry position, so it goes stale when nodes are
/// removed; see [`Selection::after_removal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Local,
    Remote(usize),
}

/// How a held selection must change after a node is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Unchanged,
    /// The selected node moved down one position.
    Shifted(Selection),
    /// The selected node itself was removed.
    ResetToLocal,
}

impl Selection {
    pub fn is_remote(self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Selection adjustment after removing the node at `removed`.
    pub fn after_removal(self, removed: usize) -> SelectionChange {
        match self {
            Self::Local => SelectionChange::Unchanged,
            Self::Remote(i) if i == removed => SelectionChange::ResetToLocal,
            Self::Remote(i) if i > removed => SelectionChange::Shifted(Self::Remote(i - 1)),
            Self::Remote(_) => SelectionChange::Unchanged,
        }
    }

    /// Apply [`after_removal`](Self::after_removal), returning the new selection.
    pub fn removing(self, removed: usize) -> Self {
        match self.after_removal(removed) {
            SelectionChange::Unchanged => self,
            SelectionChange::Shifted(next) => next,
            SelectionChange::ResetToLocal => Self::Local,
        }
    }

    /// `Local` when a remote selection no longer fits a registry of
    /// `node_count` entries.
    pub fn clamp_to(self, node_count: usize) -> Self {
        match self {
            Self::Remote(i) if i >= node_count => Self::Local,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removing_selected_node_resets_to_local() {
        assert_eq!(
            Selection::Remote(2).after_removal(2),
            SelectionChange::ResetToLocal
        );
    }

    #[test]
    fn removing_earlier_node_shifts_selection() {
        assert_eq!(
            Selection::Remote(3).after_removal(1),
            SelectionChange::Shifted(Selection::Remote(2))
        );
        assert_eq!(Selection::Remote(3).removing(0), Selection::Remote(2));
    }

    #[test]
    fn removing_later_node_keeps_selection() {
        assert_eq!(
            Selection::Remote(1).after_removal(4),
            SelectionChange::Unchanged
        );
        assert_eq!(Selection::Local.after_removal(0), SelectionChange::Unchanged);
    }

    #[test]
    fn clamp_drops_out_of_range_selection() {
        assert_eq!(Selection::Remote(2).clamp_to(2), Selection::Local);
        assert_eq!(Selection::Remote(1).clamp_to(2), Selection::Remote(1));
    }
}
