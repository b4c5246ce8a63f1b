//! Mutation observation
//!
//! The tree owns a single observer registration. Structural changes under an
//! observed target are queued as [`MutationRecord`]s until taken.

use crate::NodeId;

/// Mutation observer options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub character_data: bool,
    pub subtree: bool,
}

impl MutationObserverInit {
    /// Child-list and character-data changes anywhere below the target
    pub fn subtree() -> Self {
        Self {
            child_list: true,
            character_data: true,
            subtree: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    CharacterData,
    ChildList,
}

/// Mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
}

impl MutationRecord {
    pub(crate) fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes: added,
            removed_nodes: removed,
        }
    }

    pub(crate) fn character_data(target: NodeId) -> Self {
        Self {
            mutation_type: MutationType::CharacterData,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
        }
    }
}

/// Observer registration plus its pending records
#[derive(Debug, Default)]
pub(crate) struct MutationObserver {
    observed: Vec<(NodeId, MutationObserverInit)>,
    records: Vec<MutationRecord>,
}

impl MutationObserver {
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) {
        match self.observed.iter_mut().find(|(t, _)| *t == target) {
            Some((_, existing)) => *existing = options,
            None => self.observed.push((target, options)),
        }
    }

    pub fn disconnect(&mut self) {
        self.observed.clear();
        self.records.clear();
    }

    pub fn is_observing(&self) -> bool {
        !self.observed.is_empty()
    }

    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    /// Queue `record` if any registration covers it. `contains(a, b)` answers
    /// whether `a` is an inclusive ancestor of `b`.
    pub fn record(&mut self, record: MutationRecord, contains: impl Fn(NodeId, NodeId) -> bool) {
        let wanted = self.observed.iter().any(|&(target, options)| {
            let matches_type = match record.mutation_type {
                MutationType::ChildList => options.child_list,
                MutationType::CharacterData => options.character_data,
            };
            let matches_target = target == record.target
                || (options.subtree && contains(target, record.target));
            matches_type && matches_target
        });

        if wanted {
            self.records.push(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_and_disconnect() {
        let mut observer = MutationObserver::default();
        observer.observe(NodeId::ROOT, MutationObserverInit::subtree());
        assert!(observer.is_observing());

        observer.record(
            MutationRecord::child_list(NodeId::ROOT, vec![NodeId::new(1, 0)], Vec::new()),
            |_, _| false,
        );
        assert_eq!(observer.take_records().len(), 1);
        assert!(observer.take_records().is_empty());

        observer.disconnect();
        assert!(!observer.is_observing());
    }

    #[test]
    fn test_record_filters_by_type_and_target() {
        let mut observer = MutationObserver::default();
        observer.observe(
            NodeId::ROOT,
            MutationObserverInit {
                child_list: true,
                ..Default::default()
            },
        );

        let elsewhere = NodeId::new(5, 0);
        observer.record(MutationRecord::character_data(NodeId::ROOT), |_, _| true);
        observer.record(
            MutationRecord::child_list(elsewhere, Vec::new(), Vec::new()),
            |_, _| true,
        );
        assert!(observer.take_records().is_empty());
    }
}
