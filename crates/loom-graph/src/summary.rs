//! Aggregate shape of a story graph.

use serde::{Deserialize, Serialize};

/// Counts describing one built [`StoryGraph`](crate::StoryGraph).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    pub node_count: usize,
    /// Nodes with no resolvable parent.
    pub root_count: usize,
    /// Nodes with no children.
    pub leaf_count: usize,
    pub canon_count: usize,
    /// Deepest level reached (0 for a single root or an empty graph).
    pub max_level: usize,
    pub total_votes: u64,
    /// Nodes naming a parent that is not in the snapshot.
    pub dangling_parents: usize,
}

impl GraphSummary {
    /// Summary with only the node count filled in.
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            ..Self::default()
        }
    }

    /// Returns `true` if the graph had no nodes.
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Returns `true` if the snapshot referenced parents it did not contain.
    pub fn has_dangling_references(&self) -> bool {
        self.dangling_parents > 0
    }
}
