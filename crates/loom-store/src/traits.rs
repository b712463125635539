use loom_types::{NodeDraft, NodeId, Story, StoryDraft, StoryId, StoryNode, StorySnapshot, UserId};

use crate::error::{StoreError, StoreResult};
use crate::subscription::Subscription;

/// Which stories a listing covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoryScope {
    /// Every public story.
    Public,
    /// Every story owned by a user, public or private.
    OwnedBy(UserId),
}

/// Story listing query. Results are ordered by `updated_at`, newest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoryFilter {
    pub scope: StoryScope,
    pub limit: Option<usize>,
}

impl StoryFilter {
    pub fn public() -> Self {
        Self {
            scope: StoryScope::Public,
            limit: None,
        }
    }

    pub fn owned_by(user: impl Into<UserId>) -> Self {
        Self {
            scope: StoryScope::OwnedBy(user.into()),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns `true` if `story` falls within the scope.
    pub fn matches(&self, story: &Story) -> bool {
        match &self.scope {
            StoryScope::Public => story.is_public(),
            StoryScope::OwnedBy(owner) => &story.owner_id == owner,
        }
    }
}

/// Storage for stories and their nodes.
///
/// All implementations must satisfy these invariants:
/// - Node creation assigns `order` as the story's current node count, bumps
///   the story's `node_count`, and adds the author to its contributors.
/// - `vote_node` toggles: the same user voting twice cancels out.
/// - Every mutation publishes the affected story's full node collection to
///   its node subscribers, and the story record to its story subscribers.
/// - Missing records are reported as `Ok(None)` by reads and as
///   `StoryNotFound` / `NodeNotFound` by mutations.
pub trait StoryStore: Send + Sync {
    /// Create a story. A non-blank starter prompt becomes its canon root node.
    fn create_story(&self, draft: StoryDraft) -> StoreResult<Story>;

    /// Read a story by id.
    fn get_story(&self, id: &StoryId) -> StoreResult<Option<Story>>;

    /// List stories matching `filter`, newest update first.
    fn list_stories(&self, filter: &StoryFilter) -> StoreResult<Vec<Story>>;

    /// Add a node to a story and return it with its assigned id and order.
    fn create_node(&self, draft: NodeDraft) -> StoreResult<StoryNode>;

    /// Read a node by id.
    fn get_node(&self, id: &NodeId) -> StoreResult<Option<StoryNode>>;

    /// The full node collection of a story, ordered by `order`.
    fn story_nodes(&self, story: &StoryId) -> StoreResult<Vec<StoryNode>>;

    /// Toggle `user`'s vote on a node. Returns `true` if the user now votes.
    fn vote_node(&self, id: &NodeId, user: &UserId) -> StoreResult<bool>;

    /// Flag a node as part of the official storyline.
    fn mark_canon(&self, id: &NodeId) -> StoreResult<()>;

    /// Replace a node's content.
    fn update_content(&self, id: &NodeId, content: &str) -> StoreResult<()>;

    /// Delete a node. Its children are left pointing at the missing parent.
    /// Returns `true` if the node existed.
    fn delete_node(&self, id: &NodeId) -> StoreResult<bool>;

    /// Follow a story's node collection. The current collection is
    /// delivered immediately.
    fn subscribe_nodes(&self, story: &StoryId) -> StoreResult<Subscription<Vec<StoryNode>>>;

    /// Follow a story record. `None` is delivered if the story disappears.
    fn subscribe_story(&self, story: &StoryId) -> StoreResult<Subscription<Option<Story>>>;

    /// Story record and node collection together.
    fn snapshot(&self, story: &StoryId) -> StoreResult<StorySnapshot> {
        let record = self
            .get_story(story)?
            .ok_or_else(|| StoreError::StoryNotFound(story.clone()))?;
        let nodes = self.story_nodes(story)?;
        Ok(StorySnapshot::new(Some(record), nodes))
    }
}
