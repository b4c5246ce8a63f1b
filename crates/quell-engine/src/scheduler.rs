//! Batch scheduler
//!
//! FIFO work queue drained in fixed-size batches, one batch per host slot.
//! There is never more than one drain loop and never more than one
//! outstanding slot request: submissions during a drain are appended to the
//! same queue.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use quell_dom::{DomTree, NodeId};

use crate::host::Host;
use crate::mode::DisplayMode;
use crate::processor::NodeProcessor;

/// One unit of queued work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    pub node: NodeId,
    pub mode: DisplayMode,
}

impl WorkItem {
    pub fn new(node: NodeId, mode: DisplayMode) -> Self {
        Self { node, mode }
    }
}

/// One-shot callback fired when a whole-document pass drains
pub type Completion = Box<dyn FnOnce()>;

/// What a single slot did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SlotReport {
    /// Items handed to the processor
    pub processed: usize,
    /// Items dropped because they were already processed
    pub skipped: usize,
    /// Marker elements inserted
    pub markers: usize,
    /// Items still queued after the slot
    pub remaining: usize,
    /// The completion callback ran in this slot
    pub completed: bool,
}

pub struct BatchScheduler {
    queue: VecDeque<WorkItem>,
    batch_size: usize,
    idle_timeout: Duration,
    /// A drain loop is running
    active: bool,
    /// A host slot has been requested and has not fired yet
    slot_pending: bool,
    on_complete: Option<Completion>,
    slots_run: usize,
}

impl BatchScheduler {
    pub fn new(batch_size: usize, idle_timeout: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            batch_size: batch_size.max(1),
            idle_timeout,
            active: false,
            slot_pending: false,
            on_complete: None,
            slots_run: 0,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// No loop running and nothing queued
    pub fn is_idle(&self) -> bool {
        !self.active && self.queue.is_empty()
    }

    pub fn has_pending_slot(&self) -> bool {
        self.slot_pending
    }

    pub fn has_completion(&self) -> bool {
        self.on_complete.is_some()
    }

    /// Slots that actually ran a batch
    pub fn slots_run(&self) -> usize {
        self.slots_run
    }

    pub fn submit(&mut self, item: WorkItem, host: &mut dyn Host) {
        self.queue.push_back(item);
        self.ensure_loop(host);
    }

    pub fn submit_many(&mut self, items: impl IntoIterator<Item = WorkItem>, host: &mut dyn Host) {
        self.queue.extend(items);
        self.ensure_loop(host);
    }

    /// Queue a whole-document pass and register its completion callback.
    ///
    /// A previous registration that has not fired yet is replaced. With
    /// nothing to do the callback runs immediately.
    pub fn submit_pass(
        &mut self,
        items: impl IntoIterator<Item = WorkItem>,
        on_complete: impl FnOnce() + 'static,
        host: &mut dyn Host,
    ) {
        if self.on_complete.is_some() {
            tracing::debug!("replacing unfired pass completion");
        }
        self.queue.extend(items);
        if self.is_idle() {
            self.on_complete = None;
            on_complete();
            return;
        }
        self.on_complete = Some(Box::new(on_complete));
        self.ensure_loop(host);
    }

    fn ensure_loop(&mut self, host: &mut dyn Host) {
        if self.queue.is_empty() {
            return;
        }
        self.active = true;
        if !self.slot_pending {
            self.request_slot(host);
        }
    }

    fn request_slot(&mut self, host: &mut dyn Host) {
        if !host.request_idle_callback(self.idle_timeout) {
            host.request_animation_frame();
        }
        self.slot_pending = true;
    }

    /// Run one batch. Called by the embedder when the requested slot fires.
    pub fn run_slot(
        &mut self,
        tree: &mut DomTree,
        processor: &mut NodeProcessor,
        host: &mut dyn Host,
    ) -> SlotReport {
        self.slot_pending = false;
        let mut report = SlotReport::default();
        if !self.active && self.queue.is_empty() {
            // stale slot from before a clear()
            return report;
        }
        self.slots_run += 1;

        for _ in 0..self.batch_size {
            let Some(item) = self.queue.pop_front() else {
                break;
            };
            if processor.is_processed(item.node) {
                report.skipped += 1;
                continue;
            }
            report.markers += processor.process_node_immediate(tree, item.node, item.mode);
            report.processed += 1;
        }

        report.remaining = self.queue.len();
        if self.queue.is_empty() {
            self.active = false;
            if let Some(done) = self.on_complete.take() {
                done();
                report.completed = true;
            }
        } else {
            self.request_slot(host);
        }

        tracing::trace!(
            "slot done: {} processed, {} skipped, {} remaining",
            report.processed,
            report.skipped,
            report.remaining
        );
        report
    }

    /// Re-target queued items at `mode`
    pub fn set_mode(&mut self, mode: DisplayMode) {
        for item in &mut self.queue {
            item.mode = mode;
        }
    }

    /// Drop all queued work and any completion registration.
    ///
    /// An already requested host slot still fires and finds nothing to do.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.active = false;
        self.on_complete = None;
    }
}

impl fmt::Debug for BatchScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchScheduler")
            .field("queued", &self.queue.len())
            .field("batch_size", &self.batch_size)
            .field("active", &self.active)
            .field("slot_pending", &self.slot_pending)
            .field("has_completion", &self.on_complete.is_some())
            .finish()
    }
}
