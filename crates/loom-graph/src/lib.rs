//! Branching story graph for Storyloom.
//!
//! Turns the flat node collection of one story into a tree (or forest) and
//! drives reader traversal over it. Everything here is a pure function of a
//! node snapshot: rebuild the [`StoryGraph`] whenever a new snapshot arrives,
//! there is no incremental update path.
//!
//! - [`StoryGraph`] indexes nodes, resolves roots and levels, and ranks
//!   branches (canon children first, then votes).
//! - [`GraphLayout`] positions every node level by level for rendering.
//! - [`ReaderState`] is the reader-mode state machine over a [`Cursor`].
//!
//! Dangling parent references and parent cycles are expected in an
//! eventually consistent, collaboratively edited data set. They degrade to
//! roots (or level 0) and are never reported as errors.

pub mod error;
pub mod graph;
pub mod layout;
pub mod reader;
pub mod summary;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{GraphError, GraphResult};
pub use graph::{get_children, StoryGraph};
pub use layout::{build_graph, GraphEdge, GraphLayout, LayoutConfig, PositionedNode};
pub use reader::{Cursor, ReaderState, ReaderView};
pub use summary::GraphSummary;
