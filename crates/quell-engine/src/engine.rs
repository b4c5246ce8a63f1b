//! Engine - one document, one host
//!
//! Every public entry point first ingests the mutations the page made since
//! the last call and finally drops the records produced by the engine's own
//! writes, so the engine never reacts to itself.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use quell_dom::{Document, MutationObserverInit};
use quell_html::HtmlParser;

use crate::config::EngineConfig;
use crate::controller::{revert_processing, update_mode};
use crate::coordinator::{HoldRelease, MutationCoordinator};
use crate::host::{Host, ManualHost};
use crate::messaging::{Command, CommandOutcome};
use crate::mode::DisplayMode;
use crate::policy::VisitationPolicy;
use crate::prefs::{KeyValueStore, Preferences};
use crate::processor::NodeProcessor;
use crate::scheduler::{BatchScheduler, SlotReport, WorkItem};
use crate::EngineError;

/// Snapshot of engine state
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    /// Handles in the processed-set, stale ones included
    pub processed: usize,
    pub queued: usize,
    pub markers: usize,
    pub pending_mutations: usize,
    pub holding: bool,
    pub running: bool,
}

/// The Quell engine
#[derive(Debug)]
pub struct Engine<H: Host> {
    document: Document,
    host: H,
    config: EngineConfig,
    processor: NodeProcessor,
    scheduler: BatchScheduler,
    coordinator: MutationCoordinator,
    mode: DisplayMode,
    running: bool,
    /// Set by the completion callback of a scheduled first pass
    pass_complete: Rc<Cell<bool>>,
}

impl<H: Host> Engine<H> {
    pub fn new(document: Document, host: H, config: EngineConfig) -> Self {
        let policy = VisitationPolicy::new(config.marker_class.clone());
        let processor = NodeProcessor::new(policy, config.max_text_length);
        let scheduler = BatchScheduler::new(config.batch_size, config.idle_timeout());
        let coordinator =
            MutationCoordinator::new(config.debounce(), config.hold_quiet(), config.hold_timeout());
        tracing::debug!("Quell {} attached to {}", crate::VERSION, document.url());

        Self {
            document,
            host,
            config,
            processor,
            scheduler,
            coordinator,
            mode: DisplayMode::default(),
            running: false,
            pass_complete: Rc::new(Cell::new(false)),
        }
    }

    /// Parse `html` and attach an engine to the resulting document
    pub fn from_html(html: &str, url: &str, host: H, config: EngineConfig) -> Self {
        Self::new(HtmlParser::new().parse_with_url(html, url), host, config)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Page-side access; changes are picked up by the next entry point
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn processor(&self) -> &NodeProcessor {
        &self.processor
    }

    pub fn scheduler(&self) -> &BatchScheduler {
        &self.scheduler
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_holding(&self) -> bool {
        self.coordinator.is_holding()
    }

    /// Start filtering: hold, observe, then a full-document pass.
    ///
    /// Returns the markers inserted synchronously. When already running this
    /// switches to `mode` and repeats the pass.
    pub fn start(&mut self, mode: DisplayMode) -> usize {
        self.ingest_page_mutations();
        if self.running {
            if mode != self.mode {
                self.restyle(mode);
            }
        } else {
            tracing::info!("starting on {} in {} mode", self.document.url(), mode);
            self.mode = mode;
            self.running = true;
            self.begin_hold();
            let root = self.document.tree.root();
            self.document.tree.observe(root, MutationObserverInit::subtree());
        }

        let wrapped = self.full_pass();
        self.discard_own_mutations();
        wrapped
    }

    /// Stop observing and revert every marker; returns how many
    pub fn stop(&mut self) -> usize {
        self.document.tree.disconnect();
        if self.coordinator.end_hold() {
            self.release_hold(HoldRelease::Stopped);
        }
        self.coordinator.reset();
        self.pass_complete.set(false);
        let reverted =
            revert_processing(&mut self.document.tree, &mut self.processor, &mut self.scheduler);
        if self.running {
            tracing::info!("stopped on {}, {} markers reverted", self.document.url(), reverted);
        }
        self.running = false;
        self.discard_own_mutations();
        reverted
    }

    /// Re-stamp existing markers and queued work with `mode`
    pub fn set_mode(&mut self, mode: DisplayMode) -> usize {
        self.ingest_page_mutations();
        let restyled = self.restyle(mode);
        self.discard_own_mutations();
        restyled
    }

    /// Periodic poll: flushes debounced mutations into the queue and
    /// checks the hold. Returns the number of nodes queued.
    pub fn tick(&mut self) -> usize {
        if !self.running {
            return 0;
        }
        self.ingest_page_mutations();

        let now = self.host.now();
        let tree = &self.document.tree;
        let processor = &self.processor;
        let root = tree.root();
        // a processed ancestor is skipped whole, so it must not absorb
        // content that arrived inside it afterwards
        let survivors = self.coordinator.flush_due(
            now,
            |id| tree.is_alive(id) && tree.contains(root, id),
            |ancestor, node| !processor.is_processed(ancestor) && tree.contains(ancestor, node),
        );
        let queued = survivors.len();
        if queued > 0 {
            let mode = self.mode;
            self.scheduler.submit_many(
                survivors.into_iter().map(|node| WorkItem::new(node, mode)),
                &mut self.host,
            );
        }

        self.check_hold();
        self.discard_own_mutations();
        queued
    }

    /// Run one scheduler batch; the embedder calls this when a requested
    /// slot fires.
    pub fn run_slot(&mut self) -> SlotReport {
        self.ingest_page_mutations();
        let report =
            self.scheduler
                .run_slot(&mut self.document.tree, &mut self.processor, &mut self.host);

        if self.scheduler.is_idle() {
            self.sweep_if_needed();
        }
        if self.running {
            self.check_hold();
        }
        self.discard_own_mutations();
        report
    }

    pub fn handle_command(&mut self, command: Command) -> CommandOutcome {
        match command {
            Command::SetMode { mode } => CommandOutcome::ModeUpdated(self.set_mode(mode)),
            Command::SetEnabled { enabled: true } => CommandOutcome::Started(self.start(self.mode)),
            Command::SetEnabled { enabled: false } => CommandOutcome::Stopped(self.stop()),
            Command::Reload => {
                tracing::debug!("reload left to the embedder");
                CommandOutcome::Ignored
            }
        }
    }

    /// Decode and apply a JSON message
    pub fn handle_message(&mut self, message: &str) -> Result<CommandOutcome, EngineError> {
        let command = Command::from_json(message)?;
        Ok(self.handle_command(command))
    }

    /// Start with the stored settings unless disabled or whitelisted
    pub fn activate<S: KeyValueStore>(&mut self, prefs: &Preferences<S>) -> bool {
        if !prefs.should_run(self.document.url()) {
            tracing::info!("not running on {}", self.document.url());
            return false;
        }
        let settings = prefs.get_settings();
        self.start(settings.mode);
        true
    }

    /// Time until the coordinator next needs a [`Engine::tick`]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.coordinator.until_next_deadline(self.host.now())
    }

    pub fn stats(&self) -> EngineStats {
        let tree = &self.document.tree;
        EngineStats {
            processed: self.processor.processed().len(),
            queued: self.scheduler.len(),
            markers: tree
                .elements_by_class(tree.root(), &self.config.marker_class)
                .len(),
            pending_mutations: self.coordinator.pending_len(),
            holding: self.coordinator.is_holding(),
            running: self.running,
        }
    }

    fn restyle(&mut self, mode: DisplayMode) -> usize {
        self.mode = mode;
        self.scheduler.set_mode(mode);
        update_mode(&mut self.document.tree, &self.config.marker_class, mode)
    }

    /// Small documents are processed in place; large ones go through the
    /// scheduler and release the hold from the completion callback.
    fn full_pass(&mut self) -> usize {
        let tree = &self.document.tree;
        let body = self.document.body();
        let target = if tree.is_alive(body) { body } else { tree.root() };

        let leaves = self.processor.collect_text_leaves(tree, target);
        if leaves.len() <= self.config.sync_pass_limit {
            let wrapped = self
                .processor
                .process_node_immediate(&mut self.document.tree, target, self.mode);
            tracing::debug!("synchronous pass wrapped {} emoji", wrapped);
            if let Some(reason) = self.coordinator.first_pass_done() {
                self.release_hold(reason);
            }
            return wrapped;
        }

        tracing::debug!("scheduling pass over {} text nodes", leaves.len());
        let mode = self.mode;
        let done = Rc::clone(&self.pass_complete);
        done.set(false);
        self.scheduler.submit_pass(
            leaves.into_iter().map(|node| WorkItem::new(node, mode)),
            move || done.set(true),
            &mut self.host,
        );
        0
    }

    fn ingest_page_mutations(&mut self) {
        let records = self.document.tree.take_records();
        if records.is_empty() {
            return;
        }
        let now = self.host.now();
        let tree = &self.document.tree;
        let kept = self.coordinator.record_mutations(
            &records,
            |id| tree.get(id).is_some_and(|node| node.is_element() || node.is_text()),
            now,
        );
        tracing::trace!("{} mutation records, {} nodes pending", records.len(), kept);
    }

    fn discard_own_mutations(&mut self) {
        let own = self.document.tree.take_records();
        if !own.is_empty() {
            tracing::trace!("dropped {} records from own writes", own.len());
        }
    }

    fn check_hold(&mut self) {
        if self.pass_complete.replace(false) {
            if let Some(reason) = self.coordinator.first_pass_done() {
                self.release_hold(reason);
            }
        }
        let now = self.host.now();
        if let Some(reason) = self.coordinator.poll_hold(now, self.scheduler.is_idle()) {
            self.release_hold(reason);
        }
    }

    fn begin_hold(&mut self) {
        self.coordinator.begin_hold(self.host.now());
        let html = self.document.document_element();
        if let Some(elem) = self.document.tree.element_mut(html) {
            elem.add_class(&self.config.hold_class);
        }
    }

    fn release_hold(&mut self, reason: HoldRelease) {
        let html = self.document.document_element();
        if let Some(elem) = self.document.tree.element_mut(html) {
            elem.remove_class(&self.config.hold_class);
        }
        tracing::debug!("hold released: {:?}", reason);
    }

    fn sweep_if_needed(&mut self) {
        if self.processor.processed().len() <= self.config.sweep_threshold {
            return;
        }
        let dropped = self.processor.processed_mut().sweep(&self.document.tree);
        tracing::debug!("swept {} stale handles", dropped);
    }
}

impl Engine<ManualHost> {
    /// Drive a manual host to quiescence: fire slots, advance the clock to
    /// the next coordinator deadline, repeat. Returns the slots run.
    pub fn run_until_idle(&mut self) -> usize {
        let mut slots = 0;
        loop {
            self.tick();
            if self.host.take_slot().is_some() {
                self.run_slot();
                slots += 1;
                continue;
            }
            match self.next_deadline() {
                Some(wait) => self.host.advance(wait.max(Duration::from_millis(1))),
                None => break,
            }
        }
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<html><head><title>t 😀</title></head>\
        <body><p>Hello 😀 World</p><code>🚀</code></body></html>";

    fn engine() -> Engine<ManualHost> {
        Engine::from_html(PAGE, "https://example.com/", ManualHost::new(), EngineConfig::default())
    }

    #[test]
    fn test_start_runs_synchronous_pass() {
        let mut engine = engine();
        assert_eq!(engine.start(DisplayMode::Hide), 1);
        assert!(!engine.is_holding());
        let stats = engine.stats();
        assert_eq!(stats.markers, 1);
        assert!(stats.running);
        assert_eq!(stats.queued, 0);
        assert_eq!(engine.host().slot_requests(), 0);
    }

    #[test]
    fn test_hold_class_removed_after_first_pass() {
        let mut engine = engine();
        engine.start(DisplayMode::Hide);
        let html = engine.document().document_element();
        let elem = engine.document().tree().element(html).unwrap();
        assert!(!elem.has_class(&engine.config().hold_class));
    }

    #[test]
    fn test_own_writes_not_observed() {
        let mut engine = engine();
        engine.start(DisplayMode::Hide);
        assert_eq!(engine.tick(), 0);
        assert_eq!(engine.stats().pending_mutations, 0);
        engine.set_mode(DisplayMode::Blur);
        assert_eq!(engine.stats().pending_mutations, 0);
    }

    #[test]
    fn test_stop_reverts() {
        let mut engine = engine();
        engine.start(DisplayMode::Dim);
        assert_eq!(engine.stop(), 1);
        assert!(!engine.is_running());
        assert_eq!(engine.stats(), EngineStats::default());
        let body = engine.document().body();
        assert_eq!(engine.document().tree().text_content(body), "Hello 😀 World🚀");
    }

    #[test]
    fn test_run_until_idle_terminates_when_stopped() {
        let mut engine = engine();
        assert_eq!(engine.run_until_idle(), 0);
    }
}
