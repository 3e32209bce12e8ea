//! Domain-level errors (no external dependencies)

use itertools::Itertools;
use thiserror::Error;

use crate::domain::NodeId;

/// Domain errors represent chart invariant violations.
/// A rejected operation never leaves a partially applied change behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("invalid operation: root node {0} cannot be moved")]
    RootMove(NodeId),

    #[error("cycle: cannot move {moved} under {target}")]
    Cycle { moved: NodeId, target: NodeId },

    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    #[error("node {parent} lists unknown subordinate {child}")]
    DanglingChild { parent: NodeId, child: NodeId },

    #[error("node {0} is listed under more than one parent")]
    MultipleParents(NodeId),

    #[error("root node {root} is listed as subordinate of {parent}")]
    RootHasParent { root: NodeId, parent: NodeId },

    #[error("node {0} is not reachable from the root")]
    Unreachable(NodeId),

    #[error("cannot determine root node, candidates: [{}]", .candidates.iter().join(", "))]
    AmbiguousRoot { candidates: Vec<NodeId> },
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;
