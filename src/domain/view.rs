//! Non-authoritative view state: which chart nodes are collapsed.
//!
//! Kept apart from [`OrgTree`] so that expanding or collapsing a node can never
//! affect tree structure. Ids unknown to the tree are accepted and simply ignored
//! by traversal.

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::{NodeId, OrgTree};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    collapsed: BTreeSet<NodeId>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_collapsed<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        Self {
            collapsed: ids.into_iter().collect(),
        }
    }

    /// Flip the collapse flag of `id`, returning the new state (true = collapsed).
    pub fn toggle_collapse(&mut self, id: &NodeId) -> bool {
        let collapsed = if self.collapsed.remove(id) {
            false
        } else {
            self.collapsed.insert(id.clone());
            true
        };
        debug!("toggle {}: collapsed={}", id, collapsed);
        collapsed
    }

    pub fn collapse(&mut self, id: &NodeId) {
        self.collapsed.insert(id.clone());
    }

    pub fn expand(&mut self, id: &NodeId) {
        self.collapsed.remove(id);
    }

    pub fn is_collapsed(&self, id: &NodeId) -> bool {
        self.collapsed.contains(id)
    }

    pub fn collapsed_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.collapsed.iter()
    }

    /// Drop flags for ids the tree does not know.
    pub fn retain_known(&mut self, tree: &OrgTree) {
        self.collapsed.retain(|id| tree.contains(id));
    }
}
