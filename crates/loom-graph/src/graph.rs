//! The story graph structure and its traversal queries.
//!
//! [`StoryGraph`] stores one story's nodes in a [`HashMap`] and keeps a
//! forward-edge index (`children`) for branch enumeration. Roots and levels
//! are resolved once at build time.
//!
//! # Invariants
//!
//! - Nodes are processed in `(order, id)` order, so the graph depends only on
//!   the node set and not on the order a snapshot happened to list them in.
//! - A root is a node whose parent is absent or not present in the set.
//! - Every node has a level. A node whose ancestry walk loops back on itself
//!   gets level 0.
//! - A node never appears among its own children.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use loom_types::{NodeId, StoryNode};

use crate::reader::Cursor;
use crate::summary::GraphSummary;

/// In-memory tree (or forest) built from a flat node snapshot.
#[derive(Clone, Debug, Default)]
pub struct StoryGraph {
    /// All nodes, keyed by id.
    nodes: HashMap<NodeId, StoryNode>,
    /// Node ids sorted by `(order, id)`.
    sequence: Vec<NodeId>,
    /// Forward-edge index: parent -> children, in sequence order.
    children: HashMap<NodeId, Vec<NodeId>>,
    /// Nodes with no resolvable parent, in sequence order.
    roots: Vec<NodeId>,
    /// Distance from the nearest root.
    levels: HashMap<NodeId, usize>,
}

impl StoryGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from one story's nodes, in any order.
    ///
    /// Never fails: dangling parents become roots and cycles are broken.
    /// If the snapshot repeats an id, the last occurrence wins.
    pub fn from_nodes(nodes: impl IntoIterator<Item = StoryNode>) -> Self {
        let mut index: HashMap<NodeId, StoryNode> = HashMap::new();
        for node in nodes {
            if let Some(previous) = index.insert(node.id.clone(), node) {
                debug!(node = %previous.id, "duplicate node id in snapshot; keeping latest");
            }
        }

        let mut sequence: Vec<NodeId> = index.keys().cloned().collect();
        sequence.sort_by(|a, b| sequence_cmp(&index[a], &index[b]));

        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut roots = Vec::new();
        for id in &sequence {
            match index[id].parent_id.as_ref() {
                Some(parent) if parent == id => {}
                Some(parent) if index.contains_key(parent) => {
                    children.entry(parent.clone()).or_default().push(id.clone());
                }
                _ => roots.push(id.clone()),
            }
        }

        let mut graph = Self {
            nodes: index,
            sequence,
            children,
            roots,
            levels: HashMap::new(),
        };
        graph.levels = graph.compute_levels();

        debug!(
            nodes = graph.nodes.len(),
            roots = graph.roots.len(),
            "built story graph"
        );
        graph
    }

    /// Total number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node. Missing ids yield `None`; the snapshot may be stale.
    pub fn get(&self, id: &NodeId) -> Option<&StoryNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes in `(order, id)` order.
    pub fn nodes(&self) -> impl Iterator<Item = &StoryNode> + '_ {
        self.sequence.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Nodes with no resolvable parent, in `(order, id)` order.
    pub fn roots(&self) -> Vec<&StoryNode> {
        self.roots
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Level of a node: its distance in parent links from its nearest root.
    pub fn level(&self, id: &NodeId) -> Option<usize> {
        self.levels.get(id).copied()
    }

    /// The parent of `id`, if it is present in this graph.
    pub fn parent_of(&self, id: &NodeId) -> Option<&StoryNode> {
        let parent_id = self.resolvable_parent(id)?;
        self.nodes.get(parent_id)
    }

    /// Every child of `id`, canon or not, in `(order, id)` order.
    pub fn children(&self, id: &NodeId) -> Vec<&StoryNode> {
        self.children
            .get(id)
            .map(|ids| ids.iter().filter_map(|c| self.nodes.get(c)).collect())
            .unwrap_or_default()
    }

    /// Selectable next branches from `id`.
    ///
    /// Canon children win outright when any exist; otherwise every child is
    /// a candidate. Either way the result is ranked by votes (descending),
    /// then `order`, then id.
    pub fn branches(&self, id: &NodeId) -> Vec<&StoryNode> {
        rank_branches(self.children(id))
    }

    /// The node a reader starts from.
    ///
    /// A canon root is preferred; otherwise the first root by `order`.
    /// Returns `None` for an empty graph, or one where every node sits on
    /// a parent cycle.
    pub fn primary_root(&self) -> Option<&StoryNode> {
        let roots = self.roots();
        roots
            .iter()
            .find(|n| n.is_canon)
            .or_else(|| roots.first())
            .copied()
    }

    /// The path a reader follows by always taking the top-ranked branch,
    /// from the primary root down to a leaf.
    pub fn canonical_path(&self) -> Option<Cursor> {
        let root = self.primary_root()?;
        let mut path = vec![root.id.clone()];
        let mut seen: HashSet<&NodeId> = HashSet::from([&root.id]);
        let mut current = &root.id;

        while let Some(next) = self.branches(current).into_iter().next() {
            if !seen.insert(&next.id) {
                break;
            }
            path.push(next.id.clone());
            current = &next.id;
        }

        Cursor::from_path(path).ok()
    }

    /// Root-to-node path for `id`, following parent links upward.
    ///
    /// If the ancestry loops, the path starts at the last node reached
    /// before the loop closed. Returns `None` if `id` is not in the graph.
    pub fn path_to(&self, id: &NodeId) -> Option<Cursor> {
        let start = self.nodes.get(id)?;
        let mut path = vec![start.id.clone()];
        let mut seen: HashSet<&NodeId> = HashSet::from([&start.id]);
        let mut current = &start.id;

        while let Some(parent) = self.resolvable_parent(current) {
            if !seen.insert(parent) {
                break;
            }
            path.push(parent.clone());
            current = parent;
        }

        path.reverse();
        Cursor::from_path(path).ok()
    }

    /// Aggregate shape of the graph.
    pub fn summary(&self) -> GraphSummary {
        let mut summary = GraphSummary::new(self.nodes.len());
        summary.root_count = self.roots.len();
        for node in self.nodes.values() {
            if node.is_canon {
                summary.canon_count += 1;
            }
            summary.total_votes += node.votes();
            if !self.children.contains_key(&node.id) {
                summary.leaf_count += 1;
            }
            if let Some(parent) = &node.parent_id {
                if !self.nodes.contains_key(parent) {
                    summary.dangling_parents += 1;
                }
            }
        }
        summary.max_level = self.levels.values().copied().max().unwrap_or(0);
        summary
    }

    /// The parent id of `id`, when it names a node in this graph.
    pub(crate) fn resolvable_parent(&self, id: &NodeId) -> Option<&NodeId> {
        self.nodes
            .get(id)?
            .parent_id
            .as_ref()
            .filter(|p| self.nodes.contains_key(*p))
    }

    /// Node ids in build order.
    pub(crate) fn sequence(&self) -> &[NodeId] {
        &self.sequence
    }

    /// Memoized upward walk from every node.
    ///
    /// Each walk tracks the ids it has visited. Reaching a root or an already
    /// computed node resolves every node on the walk; revisiting a node on
    /// the current walk means a cycle, and only the walk's start is assigned
    /// (level 0).
    fn compute_levels(&self) -> HashMap<NodeId, usize> {
        let mut levels: HashMap<NodeId, usize> = HashMap::with_capacity(self.nodes.len());

        for start in &self.sequence {
            if levels.contains_key(start) {
                continue;
            }

            let mut walk: Vec<&NodeId> = vec![start];
            let mut on_walk: HashSet<&NodeId> = HashSet::from([start]);
            let mut current = start;

            // Level of the last node on the walk, or None on a cycle.
            let tail_level = loop {
                let Some(parent) = self.resolvable_parent(current) else {
                    break Some(0);
                };
                if let Some(&level) = levels.get(parent) {
                    break Some(level + 1);
                }
                if !on_walk.insert(parent) {
                    break None;
                }
                walk.push(parent);
                current = parent;
            };

            match tail_level {
                Some(tail) => {
                    let last = walk.len() - 1;
                    for (i, id) in walk.into_iter().enumerate() {
                        levels.insert(id.clone(), tail + (last - i));
                    }
                }
                None => {
                    warn!(node = %start, "parent cycle detected; treating node as level 0");
                    levels.insert(start.clone(), 0);
                }
            }
        }

        levels
    }
}

/// Selectable next branches from `node_id`, computed directly over a node
/// slice without building a graph.
///
/// Same rule as [`StoryGraph::branches`].
pub fn get_children<'a>(node_id: &NodeId, nodes: &'a [StoryNode]) -> Vec<&'a StoryNode> {
    let children = nodes
        .iter()
        .filter(|n| &n.id != node_id && n.parent_id.as_ref() == Some(node_id))
        .collect();
    rank_branches(children)
}

fn rank_branches(children: Vec<&StoryNode>) -> Vec<&StoryNode> {
    let has_canon = children.iter().any(|n| n.is_canon);
    let mut ranked: Vec<&StoryNode> = children
        .into_iter()
        .filter(|n| !has_canon || n.is_canon)
        .collect();
    ranked.sort_by(|a, b| {
        b.votes()
            .cmp(&a.votes())
            .then_with(|| sequence_cmp(a, b))
    });
    ranked
}

fn sequence_cmp(a: &StoryNode, b: &StoryNode) -> Ordering {
    a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id))
}
