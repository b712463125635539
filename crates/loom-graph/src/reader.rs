//! Reader-mode traversal.
//!
//! The reader walks one path through the story at a time. [`ReaderState`] is
//! either [`Empty`](ReaderState::Empty) (the story has no reachable root) or
//! positioned on a [`Cursor`]: the ids from a root down to the node being
//! read. Transitions only ever extend the cursor by a real child, or
//! truncate it; the cursor is rebuilt from scratch only by a reset.
//!
//! The state is owned by the caller and never persisted. Side effects of
//! navigation (awarding points, analytics) belong to the caller too.

use serde::{Deserialize, Serialize};
use tracing::debug;

use loom_types::{NodeId, StoryNode};

use crate::error::{GraphError, GraphResult};
use crate::graph::StoryGraph;

/// Non-empty path of node ids from a root to the current node.
///
/// Every adjacent pair is a parent link: `cursor[i + 1].parent_id == cursor[i]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<NodeId>", into = "Vec<NodeId>")]
pub struct Cursor(Vec<NodeId>);

impl Cursor {
    /// A cursor positioned on a single root.
    pub fn root(id: NodeId) -> Self {
        Self(vec![id])
    }

    /// Wrap an existing path. Links are not checked against any graph; use
    /// [`Cursor::is_valid_in`] for that.
    pub fn from_path(path: Vec<NodeId>) -> GraphResult<Self> {
        if path.is_empty() {
            return Err(GraphError::EmptyCursor);
        }
        Ok(Self(path))
    }

    /// The node being read.
    pub fn current(&self) -> &NodeId {
        // Non-empty by construction.
        &self.0[self.0.len() - 1]
    }

    /// The root the path starts from.
    pub fn root_id(&self) -> &NodeId {
        &self.0[0]
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.0.contains(id)
    }

    /// The ids as plain strings.
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    /// Length of the longest prefix whose nodes exist in `graph` and whose
    /// adjacent pairs are parent links there.
    pub fn valid_prefix_len(&self, graph: &StoryGraph) -> usize {
        if !graph.contains(self.root_id()) {
            return 0;
        }
        let mut len = 1;
        for pair in self.0.windows(2) {
            let linked = graph
                .get(&pair[1])
                .is_some_and(|child| child.parent_id.as_ref() == Some(&pair[0]));
            if !linked {
                break;
            }
            len += 1;
        }
        len
    }

    /// Returns `true` if every node exists in `graph` and every link holds.
    pub fn is_valid_in(&self, graph: &StoryGraph) -> bool {
        self.valid_prefix_len(graph) == self.len()
    }
}

impl TryFrom<Vec<NodeId>> for Cursor {
    type Error = GraphError;

    fn try_from(path: Vec<NodeId>) -> GraphResult<Self> {
        Self::from_path(path)
    }
}

impl From<Cursor> for Vec<NodeId> {
    fn from(cursor: Cursor) -> Self {
        cursor.0
    }
}

/// What a reader screen shows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderView<'g> {
    /// Empty when the story has no nodes.
    pub cursor: Vec<NodeId>,
    /// `None` when empty, or when the cursor outlived the node it points at.
    pub current_node: Option<&'g StoryNode>,
    /// Ranked next branches. Empty at the end of a path.
    pub branches: Vec<&'g StoryNode>,
}

impl ReaderView<'_> {
    /// No further branch: the reader may restart or write a new one.
    pub fn is_end_of_path(&self) -> bool {
        self.current_node.is_some() && self.branches.is_empty()
    }
}

/// Reader-mode state machine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "cursor", rename_all = "camelCase")]
pub enum ReaderState {
    /// The story has no node a reader could start from.
    #[default]
    Empty,
    /// Positioned on the last node of the cursor.
    AtNode(Cursor),
}

impl ReaderState {
    /// Position a new reader on the graph's primary root.
    pub fn start(graph: &StoryGraph) -> Self {
        match graph.primary_root() {
            Some(root) => Self::AtNode(Cursor::root(root.id.clone())),
            None => Self::Empty,
        }
    }

    /// Open a reader directly on `id`, with the cursor set to its root path.
    /// Unknown ids fall back to [`ReaderState::start`].
    pub fn at(graph: &StoryGraph, id: &NodeId) -> Self {
        match graph.path_to(id) {
            Some(cursor) => Self::AtNode(cursor),
            None => Self::start(graph),
        }
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        match self {
            Self::Empty => None,
            Self::AtNode(cursor) => Some(cursor),
        }
    }

    pub fn current(&self) -> Option<&NodeId> {
        self.cursor().map(Cursor::current)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Follow `child` from the current node.
    ///
    /// `child` must be in `graph` and name the current node as its parent.
    /// On rejection the cursor is left untouched.
    pub fn choose_branch(&mut self, graph: &StoryGraph, child: &NodeId) -> GraphResult<()> {
        let Self::AtNode(cursor) = self else {
            return Err(GraphError::EmptyStory);
        };
        let parent = cursor.current();
        let is_child = child != parent
            && graph
                .get(child)
                .is_some_and(|node| node.parent_id.as_ref() == Some(parent));
        if !is_child {
            return Err(GraphError::InvalidTransition {
                parent: parent.clone(),
                child: child.clone(),
            });
        }
        debug!(from = %parent, to = %child, "reader chose branch");
        cursor.0.push(child.clone());
        Ok(())
    }

    /// Step back to the previous node. Requires a cursor longer than one.
    pub fn go_back(&mut self) -> GraphResult<()> {
        let Self::AtNode(cursor) = self else {
            return Err(GraphError::EmptyStory);
        };
        if cursor.len() <= 1 {
            return Err(GraphError::AtRoot);
        }
        cursor.0.pop();
        Ok(())
    }

    /// Return to the start, recomputing the root exactly as [`start`] does.
    ///
    /// [`start`]: ReaderState::start
    pub fn reset(&mut self, graph: &StoryGraph) {
        *self = Self::start(graph);
    }

    /// Breadcrumb navigation: truncate the cursor so `index` is current.
    pub fn jump_to(&mut self, index: usize) -> GraphResult<()> {
        let Self::AtNode(cursor) = self else {
            return Err(GraphError::EmptyStory);
        };
        if index >= cursor.len() {
            return Err(GraphError::IndexOutOfRange {
                index,
                len: cursor.len(),
            });
        }
        cursor.0.truncate(index + 1);
        Ok(())
    }

    /// Re-anchor after a new snapshot.
    ///
    /// Keeps the longest still-valid prefix of the cursor. If even the root
    /// is gone, restarts from the new graph's primary root. Returns `true`
    /// if the state changed.
    pub fn rebase(&mut self, graph: &StoryGraph) -> bool {
        let next = match self {
            Self::Empty => Self::start(graph),
            Self::AtNode(cursor) => match cursor.valid_prefix_len(graph) {
                0 => Self::start(graph),
                len => {
                    let mut kept = cursor.clone();
                    kept.0.truncate(len);
                    Self::AtNode(kept)
                }
            },
        };
        if *self == next {
            return false;
        }
        debug!(?next, "reader rebased onto new snapshot");
        *self = next;
        true
    }

    /// The current node and its ranked branches.
    pub fn view<'g>(&self, graph: &'g StoryGraph) -> ReaderView<'g> {
        match self {
            Self::Empty => ReaderView {
                cursor: Vec::new(),
                current_node: None,
                branches: Vec::new(),
            },
            Self::AtNode(cursor) => ReaderView {
                cursor: cursor.ids().to_vec(),
                current_node: graph.get(cursor.current()),
                branches: graph.branches(cursor.current()),
            },
        }
    }

    /// Returns `true` when positioned on a node with no branches.
    pub fn is_end_of_path(&self, graph: &StoryGraph) -> bool {
        self.view(graph).is_end_of_path()
    }

    /// Content of every node on the path, root first. Missing nodes are
    /// skipped.
    pub fn transcript<'g>(&self, graph: &'g StoryGraph) -> Vec<&'g StoryNode> {
        self.cursor()
            .map(|c| c.ids().iter().filter_map(|id| graph.get(id)).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{binary_tree, ids, node, canon_vs_popular};

    fn nid(s: &str) -> NodeId {
        NodeId::new(s)
    }

    fn path(state: &ReaderState) -> Vec<String> {
        state.cursor().map(Cursor::to_strings).unwrap_or_default()
    }

    #[test]
    fn start_on_empty_story() {
        let graph = StoryGraph::from_nodes(Vec::new());
        let state = ReaderState::start(&graph);
        assert!(state.is_empty());
        let view = state.view(&graph);
        assert!(view.cursor.is_empty());
        assert!(view.current_node.is_none());
        assert!(!view.is_end_of_path());
    }

    #[test]
    fn canon_root_start() {
        let graph = StoryGraph::from_nodes(canon_vs_popular());
        let state = ReaderState::start(&graph);
        assert_eq!(path(&state), vec!["r"]);
        let view = state.view(&graph);
        assert_eq!(view.current_node.unwrap().id, nid("r"));
        assert_eq!(ids(&view.branches), vec!["c1"]);
    }

    #[test]
    fn choose_back_and_jump() {
        let graph = StoryGraph::from_nodes(binary_tree());
        let mut state = ReaderState::start(&graph);
        state.choose_branch(&graph, &nid("b")).unwrap();
        state.choose_branch(&graph, &nid("b1")).unwrap();
        assert_eq!(path(&state), vec!["root", "b", "b1"]);
        assert!(state.is_end_of_path(&graph));

        state.go_back().unwrap();
        assert_eq!(path(&state), vec!["root", "b"]);
        assert!(!state.is_end_of_path(&graph));

        state.choose_branch(&graph, &nid("b2")).unwrap();
        state.jump_to(0).unwrap();
        assert_eq!(path(&state), vec!["root"]);
    }

    #[test]
    fn non_canon_child_is_still_a_valid_transition() {
        let graph = StoryGraph::from_nodes(canon_vs_popular());
        let mut state = ReaderState::start(&graph);
        state.choose_branch(&graph, &nid("c2")).unwrap();
        assert_eq!(path(&state), vec!["r", "c2"]);
    }

    #[test]
    fn choosing_a_non_child_is_rejected() {
        let graph = StoryGraph::from_nodes(binary_tree());
        let mut state = ReaderState::start(&graph);
        state.choose_branch(&graph, &nid("a")).unwrap();
        let before = state.clone();

        let err = state.choose_branch(&graph, &nid("b1")).unwrap_err();
        assert_eq!(
            err,
            GraphError::InvalidTransition {
                parent: nid("a"),
                child: nid("b1"),
            }
        );
        assert_eq!(state, before);

        assert!(state.choose_branch(&graph, &nid("ghost")).is_err());
        assert!(state.choose_branch(&graph, &nid("a")).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn back_at_root_is_rejected() {
        let graph = StoryGraph::from_nodes(binary_tree());
        let mut state = ReaderState::start(&graph);
        assert_eq!(state.go_back(), Err(GraphError::AtRoot));
        assert_eq!(path(&state), vec!["root"]);
    }

    #[test]
    fn navigation_on_empty_state_is_rejected() {
        let graph = StoryGraph::new();
        let mut state = ReaderState::Empty;
        assert_eq!(state.go_back(), Err(GraphError::EmptyStory));
        assert_eq!(state.jump_to(0), Err(GraphError::EmptyStory));
        assert_eq!(
            state.choose_branch(&graph, &nid("x")),
            Err(GraphError::EmptyStory)
        );
    }

    #[test]
    fn jump_past_end_is_rejected() {
        let graph = StoryGraph::from_nodes(binary_tree());
        let mut state = ReaderState::start(&graph);
        assert_eq!(
            state.jump_to(3),
            Err(GraphError::IndexOutOfRange { index: 3, len: 1 })
        );
    }

    #[test]
    fn reset_recomputes_root() {
        let graph = StoryGraph::from_nodes(binary_tree());
        let mut state = ReaderState::start(&graph);
        state.choose_branch(&graph, &nid("a")).unwrap();
        state.reset(&graph);
        assert_eq!(path(&state), vec!["root"]);

        state.reset(&StoryGraph::new());
        assert!(state.is_empty());
    }

    #[test]
    fn open_at_node() {
        let graph = StoryGraph::from_nodes(binary_tree());
        let state = ReaderState::at(&graph, &nid("a2"));
        assert_eq!(path(&state), vec!["root", "a", "a2"]);
        let fallback = ReaderState::at(&graph, &nid("ghost"));
        assert_eq!(path(&fallback), vec!["root"]);
    }

    #[test]
    fn rebase_truncates_at_deleted_node() {
        let graph = StoryGraph::from_nodes(binary_tree());
        let mut state = ReaderState::at(&graph, &nid("b2"));

        let pruned: Vec<StoryNode> = binary_tree()
            .into_iter()
            .filter(|n| n.id != nid("b2"))
            .collect();
        let graph = StoryGraph::from_nodes(pruned);
        assert!(state.rebase(&graph));
        assert_eq!(path(&state), vec!["root", "b"]);
        assert!(!state.rebase(&graph));
    }

    #[test]
    fn rebase_restarts_when_root_vanishes() {
        let graph = StoryGraph::from_nodes(canon_vs_popular());
        let mut state = ReaderState::at(&graph, &nid("c1"));
        let graph = StoryGraph::from_nodes(vec![node("fresh", None, false, 0, 0)]);
        assert!(state.rebase(&graph));
        assert_eq!(path(&state), vec!["fresh"]);
    }

    #[test]
    fn rebase_from_empty_picks_up_first_node() {
        let mut state = ReaderState::Empty;
        let graph = StoryGraph::from_nodes(vec![node("r", None, true, 0, 0)]);
        assert!(state.rebase(&graph));
        assert_eq!(path(&state), vec!["r"]);
    }

    #[test]
    fn stale_cursor_view_degrades_to_none() {
        let graph = StoryGraph::from_nodes(canon_vs_popular());
        let state = ReaderState::AtNode(Cursor::from_path(vec![nid("r"), nid("gone")]).unwrap());
        let view = state.view(&graph);
        assert!(view.current_node.is_none());
        assert!(view.branches.is_empty());
        assert_eq!(state.transcript(&graph).len(), 1);
    }

    #[test]
    fn cursor_rejects_empty_path() {
        assert_eq!(Cursor::from_path(Vec::new()), Err(GraphError::EmptyCursor));
        let parsed: Result<Cursor, _> = serde_json::from_str("[]");
        assert!(parsed.is_err());
        let parsed: Cursor = serde_json::from_str(r#"["r","c1"]"#).unwrap();
        assert_eq!(parsed.current(), &nid("c1"));
    }

    #[test]
    fn cursor_validity_follows_links() {
        let graph = StoryGraph::from_nodes(binary_tree());
        let good = Cursor::from_path(vec![nid("root"), nid("a"), nid("a1")]).unwrap();
        assert!(good.is_valid_in(&graph));
        let bad = Cursor::from_path(vec![nid("root"), nid("a"), nid("b1")]).unwrap();
        assert_eq!(bad.valid_prefix_len(&graph), 2);
        assert!(!bad.is_valid_in(&graph));
    }
}
