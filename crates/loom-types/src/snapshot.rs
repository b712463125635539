use serde::{Deserialize, Serialize};

use crate::node::StoryNode;
use crate::story::Story;

/// The full current state of one story.
///
/// Change notifications always carry a complete snapshot, never a diff.
/// `story` is `None` when only the node collection is known (e.g. a node
/// export without its story record).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySnapshot {
    #[serde(default)]
    pub story: Option<Story>,
    #[serde(default)]
    pub nodes: Vec<StoryNode>,
}

impl StorySnapshot {
    pub fn new(story: Option<Story>, nodes: Vec<StoryNode>) -> Self {
        Self { story, nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parse a snapshot from JSON. A bare array is accepted as a node list.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.is_array() {
            let nodes = serde_json::from_value(value)?;
            return Ok(Self { story: None, nodes });
        }
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_node_array() {
        let json = r#"[
            {"id":"r","storyId":"s","content":"root","authorId":"a"},
            {"id":"c","storyId":"s","parentId":"r","content":"child","authorId":"b"}
        ]"#;
        let snap = StorySnapshot::from_json(json).unwrap();
        assert!(snap.story.is_none());
        assert_eq!(snap.nodes.len(), 2);
    }

    #[test]
    fn parses_object_form() {
        let json = r#"{"nodes":[{"id":"r","storyId":"s","content":"root","authorId":"a"}]}"#;
        let snap = StorySnapshot::from_json(json).unwrap();
        assert_eq!(snap.nodes.len(), 1);
        assert!(!snap.is_empty());
    }

    #[test]
    fn empty_object_is_empty_snapshot() {
        let snap = StorySnapshot::from_json("{}").unwrap();
        assert!(snap.is_empty());
    }
}
