//! High-level SDK for Storyloom.
//!
//! [`Loom`] ties a [`StoryStore`] to the graph builder: contributions go
//! through the store, reads come back as a freshly built [`StoryGraph`],
//! [`GraphLayout`], or [`StoryReader`]. Side effects of contributing (points,
//! notifications) belong in a [`ContributionHook`], never in the core.

pub mod config;
pub mod error;
pub mod hooks;
pub mod loom;
pub mod reader;

pub use config::LoomConfig;
pub use error::{SdkError, SdkResult};
pub use hooks::{ContributionHook, NoOpHook};
pub use loom::Loom;
pub use reader::StoryReader;

// Re-export key types
pub use loom_graph::{GraphLayout, GraphSummary, LayoutConfig, ReaderState, ReaderView, StoryGraph};
pub use loom_store::{InMemoryStoryStore, StoreConfig, StoryFilter, StoryStore, Subscription};
pub use loom_types::{NodeDraft, NodeId, Story, StoryDraft, StoryId, StoryNode, UserId, Visibility};
