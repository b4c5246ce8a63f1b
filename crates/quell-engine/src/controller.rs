//! Mode and revert operations over existing markers
//!
//! Both work on marker elements found by class, never on plain text, so
//! neither consults the processed-set for lookups.

use quell_dom::DomTree;

use crate::mode::{DisplayMode, apply_mode};
use crate::processor::NodeProcessor;
use crate::scheduler::BatchScheduler;

/// Re-stamp every marker with `mode`; returns how many were restyled
pub fn update_mode(tree: &mut DomTree, marker_class: &str, mode: DisplayMode) -> usize {
    let markers = tree.elements_by_class(tree.root(), marker_class);
    let mut updated = 0;
    for marker in markers {
        if let Some(elem) = tree.element_mut(marker) {
            apply_mode(elem, mode);
            updated += 1;
        }
    }
    tracing::debug!("restyled {} markers as {}", updated, mode);
    updated
}

/// Undo all processing.
///
/// Every marker is swapped for a fresh text node holding its character and
/// then released. Afterwards the processed-set and the work queue are empty.
/// Returns the number of markers reverted.
pub fn revert_processing(
    tree: &mut DomTree,
    processor: &mut NodeProcessor,
    scheduler: &mut BatchScheduler,
) -> usize {
    let markers = tree.elements_by_class(tree.root(), processor.policy().marker_class());
    let mut reverted = 0;

    for marker in markers {
        let original = tree.text_content(marker);
        let text = tree.create_text(original);
        if let Err(err) = tree.replace_with(marker, &[text]) {
            tracing::debug!("could not revert marker {}: {}", marker, err);
            let _ = tree.release(text);
            continue;
        }
        if let Err(err) = tree.release(marker) {
            tracing::debug!("could not release marker {}: {}", marker, err);
        }
        reverted += 1;
    }

    processor.processed_mut().clear();
    scheduler.clear();
    tracing::debug!("reverted {} markers", reverted);
    reverted
}
