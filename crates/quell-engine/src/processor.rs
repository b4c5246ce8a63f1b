//! Node processor
//!
//! The idempotent unit of work. Every node handed to
//! [`NodeProcessor::process_node_immediate`] ends up in the processed-set,
//! whatever happened to it, so a failing node never stalls the rest of the
//! document and is never retried.

use quell_dom::{DomTree, Node, NodeData, NodeId};

use crate::classifier::{contains_emoji, is_emoji};
use crate::mode::{DisplayMode, apply_mode};
use crate::policy::VisitationPolicy;
use crate::processed::ProcessedSet;
use crate::EngineError;

/// Run of a text node after splitting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Emoji(char),
}

/// Split `text` into plain runs and single emoji characters
pub fn split_segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut run_start = 0;

    for (offset, c) in text.char_indices() {
        if !is_emoji(c) {
            continue;
        }
        if run_start < offset {
            segments.push(Segment::Plain(&text[run_start..offset]));
        }
        segments.push(Segment::Emoji(c));
        run_start = offset + c.len_utf8();
    }
    if run_start < text.len() {
        segments.push(Segment::Plain(&text[run_start..]));
    }
    segments
}

/// Why a text node was left as is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotText,
    Empty,
    TooLong,
    Whitespace,
    NoEmoji,
    ParentRejected,
    /// Removed or moved before it could be replaced
    Detached,
}

/// Result of handling one text node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOutcome {
    AlreadyProcessed,
    Skipped(SkipReason),
    /// Replaced; carries the number of markers inserted
    Wrapped(usize),
}

#[derive(Debug, Clone)]
pub struct NodeProcessor {
    processed: ProcessedSet,
    policy: VisitationPolicy,
    max_text_length: usize,
}

impl NodeProcessor {
    pub fn new(policy: VisitationPolicy, max_text_length: usize) -> Self {
        Self {
            processed: ProcessedSet::new(),
            policy,
            max_text_length,
        }
    }

    pub fn policy(&self) -> &VisitationPolicy {
        &self.policy
    }

    pub fn processed(&self) -> &ProcessedSet {
        &self.processed
    }

    pub fn processed_mut(&mut self) -> &mut ProcessedSet {
        &mut self.processed
    }

    #[inline]
    pub fn is_processed(&self, id: NodeId) -> bool {
        self.processed.contains(id)
    }

    /// Process one node (text leaf or subtree) and record it as done.
    ///
    /// Returns the number of marker elements inserted.
    pub fn process_node_immediate(&mut self, tree: &mut DomTree, id: NodeId, mode: DisplayMode) -> usize {
        if !id.is_valid() || self.processed.contains(id) {
            return 0;
        }

        let result = match tree.get(id).map(|n| &n.data) {
            Some(NodeData::Text(_)) => self.process_text(tree, id, mode).map(|outcome| match outcome {
                TextOutcome::Wrapped(count) => count,
                _ => 0,
            }),
            Some(NodeData::Document) => Ok(self.process_subtree(tree, id, mode)),
            Some(NodeData::Element(_)) if !self.policy.should_skip(tree, id) => {
                Ok(self.process_subtree(tree, id, mode))
            }
            Some(_) => Ok(0),
            None => {
                tracing::trace!("node {} vanished before processing", id);
                Ok(0)
            }
        };

        self.processed.insert(id);
        result.unwrap_or_else(|err| {
            tracing::debug!("failed to process node {}: {}", id, err);
            0
        })
    }

    /// Text leaves under `root` that still need a decision, in document
    /// order. Subtrees rejected by the policy are pruned.
    pub fn collect_text_leaves(&self, tree: &DomTree, root: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack: Vec<NodeId> = tree.children(root).collect();
        stack.reverse();

        while let Some(id) = stack.pop() {
            let Some(node) = tree.get(id) else { continue };
            match &node.data {
                NodeData::Text(_) => {
                    if !self.processed.contains(id) {
                        leaves.push(id);
                    }
                }
                NodeData::Element(_) => {
                    if self.policy.should_skip(tree, id) {
                        continue;
                    }
                    let first = stack.len();
                    stack.extend(tree.children(id));
                    stack[first..].reverse();
                }
                _ => {}
            }
        }
        leaves
    }

    fn process_subtree(&mut self, tree: &mut DomTree, root: NodeId, mode: DisplayMode) -> usize {
        let mut wrapped = 0;
        for leaf in self.collect_text_leaves(tree, root) {
            match self.process_text(tree, leaf, mode) {
                Ok(TextOutcome::Wrapped(count)) => wrapped += count,
                Ok(_) => {}
                Err(err) => tracing::debug!("failed to process text node {}: {}", leaf, err),
            }
        }
        wrapped
    }

    /// Text-node handling. Always records `id` as processed.
    pub fn process_text(
        &mut self,
        tree: &mut DomTree,
        id: NodeId,
        mode: DisplayMode,
    ) -> Result<TextOutcome, EngineError> {
        if self.processed.contains(id) {
            return Ok(TextOutcome::AlreadyProcessed);
        }
        let outcome = self.split_text(tree, id, mode);
        self.processed.insert(id);
        outcome
    }

    fn split_text(
        &mut self,
        tree: &mut DomTree,
        id: NodeId,
        mode: DisplayMode,
    ) -> Result<TextOutcome, EngineError> {
        let Some(text) = tree.get(id).and_then(Node::as_text) else {
            return Ok(TextOutcome::Skipped(SkipReason::NotText));
        };
        if let Some(reason) = self.text_skip_reason(text) {
            return Ok(TextOutcome::Skipped(reason));
        }

        let Some(parent) = tree.parent(id) else {
            return Ok(TextOutcome::Skipped(SkipReason::Detached));
        };
        if self.policy.should_skip(tree, parent) {
            return Ok(TextOutcome::Skipped(SkipReason::ParentRejected));
        }

        let plan: Vec<(bool, String)> = split_segments(text)
            .into_iter()
            .map(|segment| match segment {
                Segment::Plain(run) => (false, run.to_string()),
                Segment::Emoji(c) => (true, c.to_string()),
            })
            .collect();
        let markers = plan.iter().filter(|(emoji, _)| *emoji).count();
        if markers == 0 {
            return Ok(TextOutcome::Skipped(SkipReason::NoEmoji));
        }

        // Live check right before mutating: the node may have moved since it
        // was queued.
        if tree.parent(id) != Some(parent) || !tree.contains(parent, id) {
            tracing::trace!("text node {} detached before replacement", id);
            return Ok(TextOutcome::Skipped(SkipReason::Detached));
        }

        let mut fragment = Vec::with_capacity(plan.len());
        for (emoji, content) in plan {
            if emoji {
                fragment.push(self.create_marker(tree, content, mode)?);
            } else {
                let plain = tree.create_text(content);
                self.processed.insert(plain);
                fragment.push(plain);
            }
        }

        if let Err(err) = tree.replace_with(id, &fragment) {
            for node in fragment {
                let _ = tree.release(node);
            }
            return Err(err.into());
        }
        tree.release(id)?;

        tracing::trace!("wrapped {} emoji in text node {}", markers, id);
        Ok(TextOutcome::Wrapped(markers))
    }

    fn text_skip_reason(&self, text: &str) -> Option<SkipReason> {
        if text.is_empty() {
            Some(SkipReason::Empty)
        } else if text.chars().nth(self.max_text_length).is_some() {
            Some(SkipReason::TooLong)
        } else if text.chars().all(char::is_whitespace) {
            Some(SkipReason::Whitespace)
        } else if !contains_emoji(text) {
            Some(SkipReason::NoEmoji)
        } else {
            None
        }
    }

    /// Detached `<span class=marker data-mode=..>emoji</span>`
    fn create_marker(
        &mut self,
        tree: &mut DomTree,
        emoji: String,
        mode: DisplayMode,
    ) -> Result<NodeId, EngineError> {
        let span = tree.create_element("span");
        let elem = tree
            .element_mut(span)
            .ok_or(EngineError::Dom(quell_dom::DomError::InvalidNodeType(span)))?;
        elem.add_class(self.policy.marker_class());
        apply_mode(elem, mode);

        let text = tree.create_text(emoji);
        tree.append_child(span, text)?;
        Ok(span)
    }
}
