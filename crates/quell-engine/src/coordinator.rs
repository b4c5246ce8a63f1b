//! Mutation coordinator
//!
//! Pure timing and coalescing: collects nodes added by page mutations,
//! releases them once the page has been quiet for the debounce window, and
//! tracks the initial hold. It never touches the DOM itself; liveness and
//! containment come in as predicates and time as an explicit `Instant`.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use quell_dom::{MutationRecord, MutationType, NodeId};

/// Why the hold ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldRelease {
    /// The first full-document pass finished with nothing pending
    FirstPass,
    /// No mutations for the quiet period and no work left
    Quiet,
    /// Absolute bound reached
    Timeout,
    /// Engine stopped while holding
    Stopped,
}

#[derive(Debug, Clone, Copy)]
struct Hold {
    since: Instant,
}

#[derive(Debug)]
pub struct MutationCoordinator {
    debounce: Duration,
    hold_quiet: Duration,
    hold_timeout: Duration,
    /// Added nodes in arrival order, possibly with duplicates
    pending: Vec<NodeId>,
    last_mutation: Option<Instant>,
    hold: Option<Hold>,
}

impl MutationCoordinator {
    pub fn new(debounce: Duration, hold_quiet: Duration, hold_timeout: Duration) -> Self {
        Self {
            debounce,
            hold_quiet,
            hold_timeout,
            pending: Vec::new(),
            last_mutation: None,
            hold: None,
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Ingest a batch of observed records.
    ///
    /// Only child-list additions accepted by `is_candidate` are kept, but any
    /// record restarts the debounce window. Returns the number of nodes kept.
    pub fn record_mutations(
        &mut self,
        records: &[MutationRecord],
        is_candidate: impl Fn(NodeId) -> bool,
        now: Instant,
    ) -> usize {
        if records.is_empty() {
            return 0;
        }
        let before = self.pending.len();
        for record in records {
            if record.mutation_type != MutationType::ChildList {
                continue;
            }
            self.pending
                .extend(record.added_nodes.iter().copied().filter(|&id| is_candidate(id)));
        }
        self.last_mutation = Some(now);
        self.pending.len() - before
    }

    /// Queue nodes directly, as if they had been observed at `now`
    pub fn record_added(&mut self, nodes: impl IntoIterator<Item = NodeId>, now: Instant) {
        self.pending.extend(nodes);
        self.last_mutation = Some(now);
    }

    /// Debounce window elapsed and something is waiting
    pub fn is_due(&self, now: Instant) -> bool {
        let Some(last) = self.last_mutation else {
            return false;
        };
        !self.pending.is_empty() && now.saturating_duration_since(last) >= self.debounce
    }

    /// Take the coalesced pending nodes once the debounce window has passed.
    ///
    /// Empty until then.
    pub fn flush_due(
        &mut self,
        now: Instant,
        is_alive: impl Fn(NodeId) -> bool,
        contains: impl Fn(NodeId, NodeId) -> bool,
    ) -> Vec<NodeId> {
        if !self.is_due(now) {
            return Vec::new();
        }
        let pending = std::mem::take(&mut self.pending);
        let survivors = coalesce(&pending, is_alive, contains);
        tracing::debug!("flushing {} of {} added nodes", survivors.len(), pending.len());
        survivors
    }

    /// Time until the next deadline (debounce or hold), if any
    pub fn until_next_deadline(&self, now: Instant) -> Option<Duration> {
        let debounce = self
            .last_mutation
            .filter(|_| !self.pending.is_empty())
            .map(|last| (last + self.debounce).saturating_duration_since(now));
        let hold = self.hold.map(|hold| {
            let quiet_from = self.last_mutation.map_or(hold.since, |last| last.max(hold.since));
            let quiet = (quiet_from + self.hold_quiet).saturating_duration_since(now);
            let timeout = (hold.since + self.hold_timeout).saturating_duration_since(now);
            quiet.min(timeout)
        });
        match (debounce, hold) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn begin_hold(&mut self, now: Instant) {
        self.hold = Some(Hold { since: now });
    }

    pub fn is_holding(&self) -> bool {
        self.hold.is_some()
    }

    /// Called when the first full-document pass has finished
    pub fn first_pass_done(&mut self) -> Option<HoldRelease> {
        if self.hold.is_some() && self.pending.is_empty() {
            self.hold = None;
            return Some(HoldRelease::FirstPass);
        }
        None
    }

    /// Check the hold against the quiet period and the absolute timeout
    pub fn poll_hold(&mut self, now: Instant, scheduler_idle: bool) -> Option<HoldRelease> {
        let hold = self.hold?;
        let release = if now.saturating_duration_since(hold.since) >= self.hold_timeout {
            HoldRelease::Timeout
        } else {
            let quiet_from = self.last_mutation.map_or(hold.since, |last| last.max(hold.since));
            let quiet = now.saturating_duration_since(quiet_from) >= self.hold_quiet;
            if !(quiet && scheduler_idle && self.pending.is_empty()) {
                return None;
            }
            HoldRelease::Quiet
        };
        self.hold = None;
        Some(release)
    }

    /// Drop the hold unconditionally; returns whether one was active
    pub fn end_hold(&mut self) -> bool {
        self.hold.take().is_some()
    }

    /// Forget pending nodes and any hold
    pub fn reset(&mut self) {
        self.pending.clear();
        self.last_mutation = None;
        self.hold = None;
    }
}

/// Ancestor-dominance coalescing.
///
/// Drops dead nodes and duplicates, then keeps a node only if no other
/// candidate contains it. Containment is evaluated once, against a single
/// snapshot of the candidate list, before anything is dropped. Survivors
/// keep arrival order.
pub fn coalesce(
    nodes: &[NodeId],
    is_alive: impl Fn(NodeId) -> bool,
    contains: impl Fn(NodeId, NodeId) -> bool,
) -> Vec<NodeId> {
    let mut seen = HashSet::with_capacity(nodes.len());
    let candidates: Vec<NodeId> = nodes
        .iter()
        .copied()
        .filter(|&id| is_alive(id) && seen.insert(id))
        .collect();

    let dominated: Vec<bool> = candidates
        .iter()
        .map(|&node| {
            candidates
                .iter()
                .any(|&other| other != node && contains(other, node))
        })
        .collect();

    candidates
        .into_iter()
        .zip(dominated)
        .filter_map(|(node, dominated)| (!dominated).then_some(node))
        .collect()
}
