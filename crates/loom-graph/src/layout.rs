//! Level-by-level layout of a story graph for rendering.
//!
//! Nodes are grouped by level and each group is centered horizontally:
//! `x = (index - (group_size - 1) / 2) * horizontal_spacing`,
//! `y = level * vertical_spacing`. Within a level, nodes keep the graph's
//! `(order, id)` sequence, so a re-delivered snapshot never reshuffles the
//! picture.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use loom_types::{NodeId, StoryNode};

use crate::error::{GraphError, GraphResult};
use crate::graph::StoryGraph;

/// Spacing between laid-out nodes. Presentation only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Distance between neighbours on the same level.
    pub horizontal_spacing: f64,
    /// Distance between consecutive levels.
    pub vertical_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 250.0,
            vertical_spacing: 150.0,
        }
    }
}

impl LayoutConfig {
    pub fn new(horizontal_spacing: f64, vertical_spacing: f64) -> Self {
        Self {
            horizontal_spacing,
            vertical_spacing,
        }
    }

    /// Both spacings must be finite and positive.
    pub fn validate(&self) -> GraphResult<()> {
        for (name, value) in [
            ("horizontal_spacing", self.horizontal_spacing),
            ("vertical_spacing", self.vertical_spacing),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GraphError::InvalidLayout(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// A node with its rendered position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub level: usize,
    pub source_node: StoryNode,
}

/// A directed parent-to-child edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub source_id: NodeId,
    pub target_id: NodeId,
    /// Both endpoints belong to the official storyline.
    pub is_canon_path: bool,
}

/// Positioned nodes and edges, ready for a graph view.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLayout {
    /// Ordered by level, then left to right.
    pub positioned_nodes: Vec<PositionedNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphLayout {
    pub fn is_empty(&self) -> bool {
        self.positioned_nodes.is_empty()
    }

    pub fn node(&self, id: &NodeId) -> Option<&PositionedNode> {
        self.positioned_nodes.iter().find(|p| &p.id == id)
    }

    /// Nodes on one level, left to right.
    pub fn level(&self, level: usize) -> Vec<&PositionedNode> {
        self.positioned_nodes
            .iter()
            .filter(|p| p.level == level)
            .collect()
    }

    /// Number of levels (0 for an empty layout).
    pub fn depth(&self) -> usize {
        self.positioned_nodes
            .iter()
            .map(|p| p.level + 1)
            .max()
            .unwrap_or(0)
    }
}

impl StoryGraph {
    /// Position every node and emit one edge per resolvable parent link.
    ///
    /// A node listing itself as parent yields a self edge; a node whose
    /// parent is missing yields none.
    pub fn layout(&self, config: &LayoutConfig) -> GraphLayout {
        let mut by_level: BTreeMap<usize, Vec<&StoryNode>> = BTreeMap::new();
        for node in self.nodes() {
            let level = self.level(&node.id).unwrap_or(0);
            by_level.entry(level).or_default().push(node);
        }

        let mut positioned_nodes = Vec::with_capacity(self.len());
        for (level, group) in by_level {
            let center = (group.len() as f64 - 1.0) / 2.0;
            for (index, node) in group.into_iter().enumerate() {
                positioned_nodes.push(PositionedNode {
                    id: node.id.clone(),
                    x: (index as f64 - center) * config.horizontal_spacing,
                    y: level as f64 * config.vertical_spacing,
                    level,
                    source_node: node.clone(),
                });
            }
        }

        let edges = self
            .sequence()
            .iter()
            .filter_map(|id| {
                let child = self.get(id)?;
                let parent = self.parent_of(id)?;
                Some(GraphEdge {
                    source_id: parent.id.clone(),
                    target_id: child.id.clone(),
                    is_canon_path: parent.is_canon && child.is_canon,
                })
            })
            .collect();

        GraphLayout {
            positioned_nodes,
            edges,
        }
    }
}

/// Build and lay out a graph with default spacing in one call.
pub fn build_graph(nodes: &[StoryNode]) -> GraphLayout {
    StoryGraph::from_nodes(nodes.iter().cloned()).layout(&LayoutConfig::default())
}
