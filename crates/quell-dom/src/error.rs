//! DOM operation errors

use crate::NodeId;

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// Handle is stale or was never allocated
    #[error("node {0} not found")]
    NotFound(NodeId),

    /// Insertion would create a cycle or put a child under a leaf
    #[error("hierarchy request error inserting {child} into {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    /// Operation needs a different node type
    #[error("node {0} has the wrong type for this operation")]
    InvalidNodeType(NodeId),

    /// Node is not a child of the given parent
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}
