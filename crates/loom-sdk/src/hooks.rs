use loom_types::{Story, StoryNode, UserId};

use crate::error::SdkResult;

/// Observer of successful contributions.
///
/// Hooks run after the store has accepted a change. A failing hook is logged
/// and does not undo the change.
pub trait ContributionHook: Send + Sync {
    fn on_story_created(&self, story: &Story) -> SdkResult<()>;
    fn on_node_created(&self, node: &StoryNode) -> SdkResult<()>;
    /// `voted` is the voter's state after the toggle.
    fn on_vote(&self, node: &StoryNode, voter: &UserId, voted: bool) -> SdkResult<()>;
}

pub struct NoOpHook;

impl ContributionHook for NoOpHook {
    fn on_story_created(&self, _story: &Story) -> SdkResult<()> {
        Ok(())
    }

    fn on_node_created(&self, _node: &StoryNode) -> SdkResult<()> {
        Ok(())
    }

    fn on_vote(&self, _node: &StoryNode, _voter: &UserId, _voted: bool) -> SdkResult<()> {
        Ok(())
    }
}
