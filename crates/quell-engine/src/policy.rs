//! Visitation policy
//!
//! Decides which elements are off-limits. A rejected element is neither
//! descended into nor used as the parent of a split text node.

use quell_dom::{DomTree, ElementData, NodeId};

/// Tags whose subtrees are never touched
pub const SKIP_TAGS: &[&str] = &[
    // media / embeds
    "img", "svg", "canvas", "video", "audio", "iframe",
    // scripting
    "script", "style", "noscript", "template",
    // form inputs
    "input", "textarea", "select", "option",
    // code / preformatted
    "code", "pre", "kbd", "samp",
    // document metadata
    "head", "meta", "link", "title",
];

/// ARIA roles denoting free-text entry
pub const SKIP_ROLES: &[&str] = &["textbox", "searchbox", "combobox"];

/// Skip/allow decision for subtrees and text-node parents
#[derive(Debug, Clone)]
pub struct VisitationPolicy {
    marker_class: String,
}

impl VisitationPolicy {
    pub fn new(marker_class: impl Into<String>) -> Self {
        Self {
            marker_class: marker_class.into(),
        }
    }

    /// Class identifying marker elements
    pub fn marker_class(&self) -> &str {
        &self.marker_class
    }

    /// True when `id` (and everything under it) must be left alone.
    ///
    /// Non-elements, including stale handles, are always skipped.
    pub fn should_skip(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(elem) = tree.element(id) else {
            return true;
        };

        SKIP_TAGS.contains(&elem.tag())
            || elem.has_class(&self.marker_class)
            || elem
                .attr("role")
                .is_some_and(|role| SKIP_ROLES.iter().any(|r| r.eq_ignore_ascii_case(role.trim())))
            || elem.has_attr("hidden")
            || elem.style.is_display_none()
            || is_content_editable(tree, id)
    }
}

/// `isContentEditable`: the nearest inclusive ancestor carrying a
/// `contenteditable` attribute decides.
pub fn is_content_editable(tree: &DomTree, id: NodeId) -> bool {
    let mut current = Some(id);
    while let Some(node) = current {
        if let Some(state) = tree.element(node).and_then(editable_state) {
            return state;
        }
        current = tree.parent(node);
    }
    false
}

fn editable_state(elem: &ElementData) -> Option<bool> {
    let value = elem.attr("contenteditable")?.trim().to_ascii_lowercase();
    match value.as_str() {
        "" | "true" | "plaintext-only" => Some(true),
        "false" => Some(false),
        // invalid values inherit
        _ => None,
    }
}
