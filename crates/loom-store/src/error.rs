use loom_types::{NodeId, StoryId, TypeError};

/// Errors from story store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested story does not exist.
    #[error("story not found: {0}")]
    StoryNotFound(StoryId),

    /// The requested node does not exist.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// A new node named a parent that is missing or belongs to another story.
    #[error("invalid parent {parent} for a node in story {story}")]
    InvalidParent { story: StoryId, parent: NodeId },

    /// The input failed validation.
    #[error("invalid input: {0}")]
    Invalid(#[from] TypeError),

    /// Storage backend is unavailable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
