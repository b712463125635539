use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use chrono::Utc;
use tracing::{debug, info};

use loom_types::{NodeDraft, NodeId, Story, StoryDraft, StoryId, StoryNode, TypeError, UserId};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::subscription::{SnapshotRouter, Subscription};
use crate::traits::{StoryFilter, StoryStore};

/// In-memory, HashMap-based story store.
///
/// Intended for tests, demos, and embedding. Stories and nodes sit behind
/// separate `RwLock`s; writers that need both always lock `stories` first.
/// Snapshots are published before the write guards are released, so
/// subscribers see a story's mutations in commit order.
pub struct InMemoryStoryStore {
    stories: RwLock<HashMap<StoryId, Story>>,
    nodes: RwLock<HashMap<NodeId, StoryNode>>,
    node_router: SnapshotRouter<Vec<StoryNode>>,
    story_router: SnapshotRouter<Option<Story>>,
}

impl InMemoryStoryStore {
    /// Create an empty store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        info!(channel_capacity = config.channel_capacity, "in-memory story store created");
        Self {
            stories: RwLock::new(HashMap::new()),
            nodes: RwLock::new(HashMap::new()),
            node_router: SnapshotRouter::new(config.channel_capacity),
            story_router: SnapshotRouter::new(config.channel_capacity),
        }
    }

    /// Number of stories.
    pub fn story_count(&self) -> usize {
        self.stories.read().expect("lock poisoned").len()
    }

    /// Number of nodes across all stories.
    pub fn node_count(&self) -> usize {
        self.nodes.read().expect("lock poisoned").len()
    }

    /// Insert a node verbatim, bypassing parent validation and counters.
    ///
    /// Mirrors what another backend client could write; used to load
    /// exported snapshots and to exercise readers against dangling data.
    pub fn import_node(&self, node: StoryNode) -> StoreResult<()> {
        let story = node.story_id.clone();
        let stories = self.stories.read().expect("lock poisoned");
        if !stories.contains_key(&story) {
            return Err(StoreError::StoryNotFound(story));
        }
        let mut nodes = self.nodes.write().expect("lock poisoned");
        nodes.insert(node.id.clone(), node);
        self.publish(&story, &stories, &nodes);
        Ok(())
    }

    fn nodes_of(map: &HashMap<NodeId, StoryNode>, story: &StoryId) -> Vec<StoryNode> {
        let mut nodes: Vec<StoryNode> = map
            .values()
            .filter(|n| &n.story_id == story)
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        nodes
    }

    /// Push the current state of `story` to its subscribers.
    ///
    /// Callers pass the tables they hold locked; publishing while the write
    /// guard is held keeps deliveries in commit order.
    fn publish(
        &self,
        story: &StoryId,
        stories: &HashMap<StoryId, Story>,
        nodes: &HashMap<NodeId, StoryNode>,
    ) {
        if self.node_router.has_subscribers(story) {
            self.node_router.publish(story, &Self::nodes_of(nodes, story));
        }
        if self.story_router.has_subscribers(story) {
            self.story_router.publish(story, &stories.get(story).cloned());
        }
    }

    /// Apply `update` to a node and publish its story. `touch` bumps the
    /// story's `updated_at`.
    fn with_node_mut<R>(
        &self,
        id: &NodeId,
        touch: bool,
        update: impl FnOnce(&mut StoryNode) -> R,
    ) -> StoreResult<R> {
        let mut stories = self.stories.write().expect("lock poisoned");
        let mut nodes = self.nodes.write().expect("lock poisoned");
        let node = nodes
            .get_mut(id)
            .ok_or_else(|| StoreError::NodeNotFound(id.clone()))?;
        let result = update(node);
        let story = node.story_id.clone();
        if touch {
            if let Some(record) = stories.get_mut(&story) {
                record.touch();
            }
        }
        self.publish(&story, &stories, &nodes);
        Ok(result)
    }
}

impl Default for InMemoryStoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryStore for InMemoryStoryStore {
    fn create_story(&self, draft: StoryDraft) -> StoreResult<Story> {
        draft.validate()?;
        let now = Utc::now();
        let mut story = Story {
            id: StoryId::generate(),
            title: draft.title.trim().to_string(),
            genre: draft.genre.clone(),
            visibility: draft.visibility,
            owner_id: draft.owner_id.clone(),
            owner_name: draft.owner_name.clone(),
            description: draft.description.clone(),
            starter_prompt: draft.starter_prompt.clone(),
            contributors: BTreeSet::from([draft.owner_id.clone()]),
            node_count: 0,
            created_at: now,
            updated_at: now,
        };

        // Blank prompts create no root; others are stored as written.
        let prompt = draft
            .effective_prompt()
            .and(draft.starter_prompt.as_deref());
        let root = prompt.map(|prompt| {
            StoryNode::new(
                NodeId::generate(),
                story.id.clone(),
                None,
                prompt,
                draft.owner_id.clone(),
            )
            .with_author_name(draft.owner_name.clone())
            .with_canon(true)
            .with_order(0)
        });

        {
            let mut stories = self.stories.write().expect("lock poisoned");
            let mut nodes = self.nodes.write().expect("lock poisoned");
            if let Some(root) = root {
                story.node_count = 1;
                nodes.insert(root.id.clone(), root);
            }
            stories.insert(story.id.clone(), story.clone());
        }

        debug!(story = %story.id.short_id(), nodes = story.node_count, "created story");
        Ok(story)
    }

    fn get_story(&self, id: &StoryId) -> StoreResult<Option<Story>> {
        let stories = self.stories.read().expect("lock poisoned");
        Ok(stories.get(id).cloned())
    }

    fn list_stories(&self, filter: &StoryFilter) -> StoreResult<Vec<Story>> {
        let stories = self.stories.read().expect("lock poisoned");
        let mut matching: Vec<Story> = stories
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        if let Some(limit) = filter.limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }

    fn create_node(&self, draft: NodeDraft) -> StoreResult<StoryNode> {
        draft.validate()?;
        let node = {
            let mut stories = self.stories.write().expect("lock poisoned");
            let mut nodes = self.nodes.write().expect("lock poisoned");

            let story = stories
                .get_mut(&draft.story_id)
                .ok_or_else(|| StoreError::StoryNotFound(draft.story_id.clone()))?;

            if let Some(parent) = &draft.parent_id {
                let same_story = nodes
                    .get(parent)
                    .is_some_and(|p| p.story_id == draft.story_id);
                if !same_story {
                    return Err(StoreError::InvalidParent {
                        story: draft.story_id.clone(),
                        parent: parent.clone(),
                    });
                }
            }

            let order = nodes
                .values()
                .filter(|n| n.story_id == draft.story_id)
                .count() as u64;
            let node = StoryNode::new(
                NodeId::generate(),
                draft.story_id.clone(),
                draft.parent_id.clone(),
                draft.content.trim(),
                draft.author_id.clone(),
            )
            .with_author_name(draft.author_name.clone())
            .with_order(order);

            story.node_count += 1;
            story.add_contributor(&draft.author_id);
            story.touch();
            nodes.insert(node.id.clone(), node.clone());
            self.publish(&node.story_id, &stories, &nodes);
            node
        };

        debug!(
            story = %node.story_id.short_id(),
            node = %node.id.short_id(),
            order = node.order,
            "created node"
        );
        Ok(node)
    }

    fn get_node(&self, id: &NodeId) -> StoreResult<Option<StoryNode>> {
        let nodes = self.nodes.read().expect("lock poisoned");
        Ok(nodes.get(id).cloned())
    }

    fn story_nodes(&self, story: &StoryId) -> StoreResult<Vec<StoryNode>> {
        let nodes = self.nodes.read().expect("lock poisoned");
        Ok(Self::nodes_of(&nodes, story))
    }

    fn vote_node(&self, id: &NodeId, user: &UserId) -> StoreResult<bool> {
        let voted = self.with_node_mut(id, false, |node| node.toggle_vote(user))?;
        debug!(node = %id.short_id(), user = %user, voted, "toggled vote");
        Ok(voted)
    }

    fn mark_canon(&self, id: &NodeId) -> StoreResult<()> {
        self.with_node_mut(id, true, |node| node.is_canon = true)?;
        debug!(node = %id.short_id(), "marked canon");
        Ok(())
    }

    fn update_content(&self, id: &NodeId, content: &str) -> StoreResult<()> {
        let content = content.trim();
        if content.is_empty() {
            return Err(TypeError::MissingField("content").into());
        }
        self.with_node_mut(id, true, |node| node.content = content.to_string())
    }

    fn delete_node(&self, id: &NodeId) -> StoreResult<bool> {
        let mut stories = self.stories.write().expect("lock poisoned");
        let mut nodes = self.nodes.write().expect("lock poisoned");
        let Some(removed) = nodes.remove(id) else {
            return Ok(false);
        };
        let remaining = nodes
            .values()
            .filter(|n| n.story_id == removed.story_id)
            .count() as u64;
        if let Some(record) = stories.get_mut(&removed.story_id) {
            record.node_count = remaining;
            record.touch();
        }
        self.publish(&removed.story_id, &stories, &nodes);
        debug!(node = %id.short_id(), "deleted node");
        Ok(true)
    }

    fn subscribe_nodes(&self, story: &StoryId) -> StoreResult<Subscription<Vec<StoryNode>>> {
        // Registering under the read guards means no mutation can slip in
        // between the initial snapshot and the first publish.
        let stories = self.stories.read().expect("lock poisoned");
        if !stories.contains_key(story) {
            return Err(StoreError::StoryNotFound(story.clone()));
        }
        let nodes = self.nodes.read().expect("lock poisoned");
        Ok(self
            .node_router
            .subscribe(story.clone(), Self::nodes_of(&nodes, story)))
    }

    fn subscribe_story(&self, story: &StoryId) -> StoreResult<Subscription<Option<Story>>> {
        let stories = self.stories.read().expect("lock poisoned");
        let record = stories
            .get(story)
            .cloned()
            .ok_or_else(|| StoreError::StoryNotFound(story.clone()))?;
        Ok(self.story_router.subscribe(story.clone(), Some(record)))
    }
}

impl std::fmt::Debug for InMemoryStoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStoryStore")
            .field("story_count", &self.story_count())
            .field("node_count", &self.node_count())
            .finish()
    }
}
