//! Processed-node membership
//!
//! Keyed by node handle, never by node value, and holding no ownership of
//! the nodes. Generational handles make a stale entry harmless: a node that
//! is released and re-created gets a different [`NodeId`]. Stale entries are
//! dropped by [`ProcessedSet::sweep`].

use std::collections::HashSet;

use quell_dom::{DomTree, NodeId};

#[derive(Debug, Default, Clone)]
pub struct ProcessedSet {
    nodes: HashSet<NodeId>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// Record a final decision; returns false if already recorded
    #[inline]
    pub fn insert(&mut self, id: NodeId) -> bool {
        self.nodes.insert(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Drop handles whose node no longer exists; returns how many went
    pub fn sweep(&mut self, tree: &DomTree) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|&id| tree.is_alive(id));
        before - self.nodes.len()
    }
}
