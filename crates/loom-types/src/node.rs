//! Narrative node records.
//!
//! A [`StoryNode`] is one fragment of a story's branching tree. Nodes link to
//! their parent by id only; the tree is re-derived from the flat collection
//! on every snapshot.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::id::{NodeId, StoryId, UserId};

/// One unit of narrative content within exactly one story.
///
/// Votes are kept as a voter set plus a counter. When voter identities are
/// known the set is authoritative and [`votes`] equals `|voters|`. A
/// document that only carries a `votes` count keeps that count; voters are
/// then added and removed on top of it. Both fields are serialized.
///
/// [`votes`]: StoryNode::votes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NodeDocument", into = "NodeDocument")]
pub struct StoryNode {
    pub id: NodeId,
    pub story_id: StoryId,
    /// Parent node in the same story. `None` marks a root.
    pub parent_id: Option<NodeId>,
    pub content: String,
    pub author_id: UserId,
    pub author_name: String,
    /// Identities that currently vote for this node.
    voters: BTreeSet<UserId>,
    /// Never below `voters.len()`.
    votes: u64,
    /// Part of the official storyline.
    pub is_canon: bool,
    /// Insertion sequence within the story. Tie-break key only.
    pub order: u64,
    pub created_at: DateTime<Utc>,
}

/// Backend document shape of a node.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeDocument {
    id: NodeId,
    story_id: StoryId,
    #[serde(default)]
    parent_id: Option<NodeId>,
    content: String,
    author_id: UserId,
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    votes: Option<u64>,
    #[serde(default)]
    voters: BTreeSet<UserId>,
    #[serde(default)]
    is_canon: bool,
    #[serde(default)]
    order: u64,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

impl From<NodeDocument> for StoryNode {
    fn from(doc: NodeDocument) -> Self {
        let known = doc.voters.len() as u64;
        let votes = match doc.votes {
            None => known,
            Some(count) if doc.voters.is_empty() => count,
            Some(count) => {
                if count != known {
                    warn!(
                        node = %doc.id,
                        votes = count,
                        voters = known,
                        "vote count disagrees with voter set; using voter set"
                    );
                }
                known
            }
        };
        Self {
            id: doc.id,
            story_id: doc.story_id,
            parent_id: doc.parent_id,
            content: doc.content,
            author_id: doc.author_id,
            author_name: doc.author_name,
            voters: doc.voters,
            votes,
            is_canon: doc.is_canon,
            order: doc.order,
            created_at: doc.created_at,
        }
    }
}

impl From<StoryNode> for NodeDocument {
    fn from(node: StoryNode) -> Self {
        Self {
            id: node.id,
            story_id: node.story_id,
            parent_id: node.parent_id,
            content: node.content,
            author_id: node.author_id,
            author_name: node.author_name,
            votes: Some(node.votes),
            voters: node.voters,
            is_canon: node.is_canon,
            order: node.order,
            created_at: node.created_at,
        }
    }
}

impl StoryNode {
    /// Create a non-canon node with no votes.
    pub fn new(
        id: impl Into<NodeId>,
        story_id: impl Into<StoryId>,
        parent_id: Option<NodeId>,
        content: impl Into<String>,
        author_id: impl Into<UserId>,
    ) -> Self {
        Self {
            id: id.into(),
            story_id: story_id.into(),
            parent_id,
            content: content.into(),
            author_id: author_id.into(),
            author_name: String::new(),
            voters: BTreeSet::new(),
            votes: 0,
            is_canon: false,
            order: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_canon(mut self, is_canon: bool) -> Self {
        self.is_canon = is_canon;
        self
    }

    pub fn with_order(mut self, order: u64) -> Self {
        self.order = order;
        self
    }

    pub fn with_author_name(mut self, name: impl Into<String>) -> Self {
        self.author_name = name.into();
        self
    }

    pub fn with_voters<I, U>(mut self, voters: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<UserId>,
    {
        self.voters = voters.into_iter().map(Into::into).collect();
        self.votes = self.voters.len() as u64;
        self
    }

    /// Set a bare vote count for a node whose voters are not known.
    /// Never drops below the number of known voters.
    pub fn with_votes(mut self, votes: u64) -> Self {
        self.votes = votes.max(self.voters.len() as u64);
        self
    }

    pub fn votes(&self) -> u64 {
        self.votes
    }

    pub fn voters(&self) -> &BTreeSet<UserId> {
        &self.voters
    }

    /// Returns `true` if this node declares no parent.
    ///
    /// A node whose parent is missing from a snapshot is also treated as a
    /// root by the graph; that decision needs the whole node set.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Returns `true` if `user` currently votes for this node.
    pub fn has_voted(&self, user: &UserId) -> bool {
        self.voters.contains(user)
    }

    /// Toggle `user`'s vote. Returns `true` if the user now votes for the node.
    pub fn toggle_vote(&mut self, user: &UserId) -> bool {
        if self.voters.remove(user) {
            self.votes = self.votes.saturating_sub(1).max(self.voters.len() as u64);
            false
        } else {
            self.voters.insert(user.clone());
            self.votes += 1;
            true
        }
    }

    /// First line of the content, truncated to `max_chars`, for listings.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let line = self.content.lines().next().unwrap_or_default().trim();
        if line.chars().count() <= max_chars {
            line.to_string()
        } else {
            let cut: String = line.chars().take(max_chars).collect();
            format!("{cut}...")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> StoryNode {
        StoryNode::new("n1", "s1", None, "Once upon a time", "alice")
    }

    #[test]
    fn votes_follow_voters() {
        let n = node().with_voters(["a", "b", "c"]);
        assert_eq!(n.votes(), 3);
    }

    #[test]
    fn toggle_vote_is_idempotent_per_user() {
        let mut n = node();
        let bob = UserId::new("bob");
        assert!(n.toggle_vote(&bob));
        assert_eq!(n.votes(), 1);
        assert!(n.has_voted(&bob));
        assert!(!n.toggle_vote(&bob));
        assert_eq!(n.votes(), 0);
    }

    #[test]
    fn root_detection_uses_parent_id() {
        assert!(node().is_root());
        let child = StoryNode::new("n2", "s1", Some(NodeId::new("n1")), "then", "bob");
        assert!(!child.is_root());
    }

    #[test]
    fn excerpt_truncates_long_lines() {
        let n = StoryNode::new("n", "s", None, "abcdefghij\nsecond line", "a");
        assert_eq!(n.excerpt(4), "abcd...");
        assert_eq!(n.excerpt(20), "abcdefghij");
    }

    #[test]
    fn missing_optional_fields_take_explicit_defaults() {
        let json = r#"{
            "id": "c1",
            "storyId": "s1",
            "parentId": "r",
            "content": "A door creaks.",
            "authorId": "bob"
        }"#;
        let n: StoryNode = serde_json::from_str(json).unwrap();
        assert_eq!(n.votes(), 0);
        assert!(!n.is_canon);
        assert_eq!(n.order, 0);
        assert_eq!(n.parent_id, Some(NodeId::new("r")));
    }

    #[test]
    fn null_parent_is_root() {
        let json = r#"{"id":"r","storyId":"s1","parentId":null,"content":"x","authorId":"a"}"#;
        let n: StoryNode = serde_json::from_str(json).unwrap();
        assert!(n.is_root());
    }

    #[test]
    fn bare_vote_count_is_kept_and_written_back() {
        let json = r#"{"id":"c2","storyId":"s1","parentId":"r","content":"x","authorId":"a","votes":9}"#;
        let n: StoryNode = serde_json::from_str(json).unwrap();
        assert_eq!(n.votes(), 9);
        assert!(n.voters().is_empty());

        let out = serde_json::to_value(&n).unwrap();
        assert_eq!(out["votes"], 9);
        let again: StoryNode = serde_json::from_value(out).unwrap();
        assert_eq!(again, n);
    }

    #[test]
    fn voter_set_wins_over_disagreeing_count() {
        let json = r#"{"id":"c1","storyId":"s1","content":"x","authorId":"a","votes":7,"voters":["u1","u2"]}"#;
        let n: StoryNode = serde_json::from_str(json).unwrap();
        assert_eq!(n.votes(), 2);
        assert_eq!(serde_json::to_value(&n).unwrap()["votes"], 2);
    }

    #[test]
    fn toggling_on_top_of_a_bare_count() {
        let mut n = node().with_votes(4);
        let bob = UserId::new("bob");
        assert!(n.toggle_vote(&bob));
        assert_eq!(n.votes(), 5);
        assert!(!n.toggle_vote(&bob));
        assert_eq!(n.votes(), 4);
    }
}
