//! Error types for graph traversal.

use loom_types::NodeId;

/// Caller-contract violations during reader navigation or layout setup.
///
/// Malformed data (dangling parents, cycles) is recovered silently and never
/// produces one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The requested branch is not a child of the cursor's current node.
    #[error("invalid transition: {child} is not a child of {parent}")]
    InvalidTransition {
        /// The cursor's current node.
        parent: NodeId,
        /// The rejected branch.
        child: NodeId,
    },

    /// Cannot step back from the root of the path.
    #[error("cursor is already at the root")]
    AtRoot,

    /// Navigation requested on a story without nodes.
    #[error("story has no nodes")]
    EmptyStory,

    /// Breadcrumb index past the end of the cursor.
    #[error("path index {index} out of range (path length {len})")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Current cursor length.
        len: usize,
    },

    /// A cursor must hold at least one node.
    #[error("cursor cannot be empty")]
    EmptyCursor,

    /// Layout parameters are unusable.
    #[error("invalid layout configuration: {0}")]
    InvalidLayout(String),
}

/// Convenience alias for graph results.
pub type GraphResult<T> = Result<T, GraphError>;
