use loom_graph::{GraphResult, ReaderState, ReaderView, StoryGraph};
use loom_types::{NodeId, StoryId, StoryNode};

/// A reader session: one story's graph plus a reader position in it.
///
/// Feed new snapshots through [`refresh`](StoryReader::refresh); the
/// position survives as far as the new graph allows.
#[derive(Debug)]
pub struct StoryReader {
    story: StoryId,
    graph: StoryGraph,
    state: ReaderState,
}

impl StoryReader {
    pub fn new(story: StoryId, nodes: Vec<StoryNode>) -> Self {
        let graph = StoryGraph::from_nodes(nodes);
        let state = ReaderState::start(&graph);
        Self {
            story,
            graph,
            state,
        }
    }

    pub fn story(&self) -> &StoryId {
        &self.story
    }

    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    pub fn state(&self) -> &ReaderState {
        &self.state
    }

    pub fn view(&self) -> ReaderView<'_> {
        self.state.view(&self.graph)
    }

    pub fn choose(&mut self, child: &NodeId) -> GraphResult<()> {
        self.state.choose_branch(&self.graph, child)
    }

    pub fn back(&mut self) -> GraphResult<()> {
        self.state.go_back()
    }

    pub fn jump_to(&mut self, index: usize) -> GraphResult<()> {
        self.state.jump_to(index)
    }

    pub fn reset(&mut self) {
        self.state.reset(&self.graph);
    }

    /// Move to the end of the canonical path. Returns `false` for an empty story.
    pub fn follow_canon(&mut self) -> bool {
        match self.graph.canonical_path() {
            Some(cursor) => {
                self.state = ReaderState::AtNode(cursor);
                true
            }
            None => false,
        }
    }

    pub fn is_end_of_path(&self) -> bool {
        self.state.is_end_of_path(&self.graph)
    }

    /// Nodes read so far, root first.
    pub fn transcript(&self) -> Vec<&StoryNode> {
        self.state.transcript(&self.graph)
    }

    /// Rebuild the graph from a new snapshot and re-anchor the position.
    /// Returns `true` if the position moved.
    pub fn refresh(&mut self, nodes: Vec<StoryNode>) -> bool {
        self.graph = StoryGraph::from_nodes(nodes);
        self.state.rebase(&self.graph)
    }
}
