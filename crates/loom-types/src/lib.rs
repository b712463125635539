//! Foundation types for Storyloom.
//!
//! This crate provides the identifier and record types shared by every other
//! Storyloom crate. Records mirror the document shape of the hosted backend:
//! a `stories` collection and a `nodes` collection whose documents reference
//! a story by id and, optionally, a parent node by id.
//!
//! # Key Types
//!
//! - [`StoryId`], [`NodeId`], [`UserId`] — Opaque backend document identifiers
//! - [`Story`] — Ownership, visibility, and contributor record of a narrative
//! - [`StoryNode`] — One narrative fragment in a story's branching tree
//! - [`StoryDraft`], [`NodeDraft`] — Inputs to the creation ports
//! - [`StorySnapshot`] — Full story state delivered by subscriptions

pub mod draft;
pub mod error;
pub mod id;
pub mod node;
pub mod snapshot;
pub mod story;

pub use draft::{NodeDraft, StoryDraft};
pub use error::TypeError;
pub use id::{NodeId, StoryId, UserId};
pub use node::StoryNode;
pub use snapshot::StorySnapshot;
pub use story::{Story, Visibility};
