use std::sync::Arc;

use tracing::{debug, warn};

use loom_graph::{GraphLayout, StoryGraph};
use loom_store::{InMemoryStoryStore, StoreError, StoryFilter, StoryStore, Subscription};
use loom_types::{NodeDraft, NodeId, Story, StoryDraft, StoryId, StoryNode, UserId};

use crate::config::LoomConfig;
use crate::error::SdkResult;
use crate::hooks::ContributionHook;
use crate::reader::StoryReader;

/// High-level Storyloom API.
pub struct Loom<S: StoryStore = InMemoryStoryStore> {
    store: S,
    config: LoomConfig,
    hooks: Vec<Arc<dyn ContributionHook>>,
}

impl Loom<InMemoryStoryStore> {
    /// An in-memory Loom with default configuration.
    pub fn new() -> Self {
        Self::from_parts(InMemoryStoryStore::new(), LoomConfig::default())
    }

    /// An in-memory Loom configured by `config`.
    pub fn with_config(config: LoomConfig) -> SdkResult<Self> {
        config.validate()?;
        let store = InMemoryStoryStore::with_config(config.store.clone());
        Ok(Self::from_parts(store, config))
    }
}

impl Default for Loom<InMemoryStoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StoryStore> Loom<S> {
    /// Wrap an existing store.
    pub fn with_store(store: S, config: LoomConfig) -> SdkResult<Self> {
        config.validate()?;
        Ok(Self::from_parts(store, config))
    }

    fn from_parts(store: S, config: LoomConfig) -> Self {
        Self {
            store,
            config,
            hooks: Vec::new(),
        }
    }

    /// Register a hook. Hooks run in registration order.
    pub fn with_hook(mut self, hook: impl ContributionHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LoomConfig {
        &self.config
    }

    // ---- Contribution operations ----

    pub fn create_story(&self, draft: StoryDraft) -> SdkResult<Story> {
        let story = self.store.create_story(draft)?;
        self.run_hooks("story_created", |hook| hook.on_story_created(&story));
        Ok(story)
    }

    /// Add a node to a story. `draft.parent_id == None` starts a new root.
    pub fn contribute(&self, draft: NodeDraft) -> SdkResult<StoryNode> {
        let node = self.store.create_node(draft)?;
        self.run_hooks("node_created", |hook| hook.on_node_created(&node));
        Ok(node)
    }

    /// Toggle `voter`'s vote on a node. Returns `true` if the vote now counts.
    pub fn vote(&self, node: &NodeId, voter: &UserId) -> SdkResult<bool> {
        let voted = self.store.vote_node(node, voter)?;
        if !self.hooks.is_empty() {
            if let Some(updated) = self.store.get_node(node)? {
                self.run_hooks("vote", |hook| hook.on_vote(&updated, voter, voted));
            }
        }
        Ok(voted)
    }

    pub fn mark_canon(&self, node: &NodeId) -> SdkResult<()> {
        Ok(self.store.mark_canon(node)?)
    }

    pub fn edit(&self, node: &NodeId, content: &str) -> SdkResult<()> {
        Ok(self.store.update_content(node, content)?)
    }

    /// Delete a node. Returns `false` if it was already gone.
    pub fn remove(&self, node: &NodeId) -> SdkResult<bool> {
        Ok(self.store.delete_node(node)?)
    }

    // ---- Read operations ----

    pub fn stories(&self, filter: &StoryFilter) -> SdkResult<Vec<Story>> {
        Ok(self.store.list_stories(filter)?)
    }

    /// Graph built from the story's current nodes.
    pub fn graph(&self, story: &StoryId) -> SdkResult<StoryGraph> {
        Ok(StoryGraph::from_nodes(self.nodes(story)?))
    }

    /// Layout of the story's current nodes with the configured spacing.
    pub fn layout(&self, story: &StoryId) -> SdkResult<GraphLayout> {
        Ok(self.graph(story)?.layout(&self.config.layout))
    }

    /// A reader session positioned at the story's start.
    pub fn reader(&self, story: &StoryId) -> SdkResult<StoryReader> {
        Ok(StoryReader::new(story.clone(), self.nodes(story)?))
    }

    /// The canonical path's contents joined by blank lines.
    pub fn canonical_text(&self, story: &StoryId) -> SdkResult<String> {
        let graph = self.graph(story)?;
        let Some(path) = graph.canonical_path() else {
            return Ok(String::new());
        };
        let text = path
            .ids()
            .iter()
            .filter_map(|id| graph.get(id))
            .map(|node| node.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(text)
    }

    /// Follow the story's node collection; feed each delivery to
    /// [`StoryReader::refresh`] or [`StoryGraph::from_nodes`].
    pub fn subscribe(&self, story: &StoryId) -> SdkResult<Subscription<Vec<StoryNode>>> {
        Ok(self.store.subscribe_nodes(story)?)
    }

    fn nodes(&self, story: &StoryId) -> SdkResult<Vec<StoryNode>> {
        if self.store.get_story(story)?.is_none() {
            return Err(StoreError::StoryNotFound(story.clone()).into());
        }
        let nodes = self.store.story_nodes(story)?;
        debug!(story = %story.short_id(), nodes = nodes.len(), "loaded story nodes");
        Ok(nodes)
    }

    fn run_hooks(&self, event: &str, call: impl Fn(&dyn ContributionHook) -> SdkResult<()>) {
        for hook in &self.hooks {
            if let Err(e) = call(hook.as_ref()) {
                warn!(event, error = %e, "contribution hook failed");
            }
        }
    }
}
