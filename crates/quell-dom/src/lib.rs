//! Quell DOM - Document Object Model
//!
//! Arena-backed DOM tree. Nodes are addressed by generational [`NodeId`]
//! handles, so a handle to a released node never aliases a node created later
//! in the same slot.

mod document;
mod error;
mod node;
mod observer;
mod style;
mod tree;

pub use document::Document;
pub use error::{DomError, DomResult};
pub use node::{Attribute, ElementData, Node, NodeData};
pub use observer::{MutationObserverInit, MutationRecord, MutationType};
pub use style::InlineStyle;
pub use tree::{Children, Descendants, DomTree};

/// Node identifier: arena slot plus the generation the slot had when the
/// node was allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId { index: 0, generation: 0 };

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId { index: u32::MAX, generation: 0 };

    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Whether this is a real handle (not [`NodeId::NONE`])
    #[inline]
    pub fn is_valid(self) -> bool {
        self.index != u32::MAX
    }

    /// Arena slot index
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation at allocation time
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }

    #[inline]
    pub(crate) fn option(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}
