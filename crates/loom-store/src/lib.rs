//! Story and node storage for Storyloom.
//!
//! The hosted backend keeps two collections, `stories` and `nodes`; this
//! crate is the narrow port the rest of Storyloom talks to it through.
//!
//! # Storage Backends
//!
//! All backends implement the [`StoryStore`] trait:
//!
//! - [`InMemoryStoryStore`] -- `HashMap`-based store for tests, demos, and
//!   embedding
//!
//! # Design Rules
//!
//! 1. Every mutation publishes the *full* current node collection of the
//!    affected story to its subscribers. Subscribers never see diffs.
//! 2. Votes are a toggle per user: voting twice restores the original state.
//! 3. New nodes get `order` = number of nodes already in the story.
//! 4. The store validates parents at creation time; readers must still
//!    tolerate dangling parents written by other clients.
//! 5. Unsubscribing is dropping the [`Subscription`].

pub mod config;
pub mod error;
pub mod memory;
pub mod subscription;
pub mod traits;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStoryStore;
pub use subscription::Subscription;
pub use traits::{StoryFilter, StoryScope, StoryStore};
