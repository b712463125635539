//! Creation inputs for stories and nodes.

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::{NodeId, StoryId, UserId};
use crate::story::Visibility;

/// Everything needed to create a story.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDraft {
    pub title: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub visibility: Visibility,
    pub owner_id: UserId,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Opening text. When present, becomes the canon root node.
    #[serde(default)]
    pub starter_prompt: Option<String>,
}

impl StoryDraft {
    pub fn new(title: impl Into<String>, owner_id: impl Into<UserId>) -> Self {
        Self {
            title: title.into(),
            genre: String::new(),
            visibility: Visibility::Public,
            owner_id: owner_id.into(),
            owner_name: String::new(),
            description: None,
            starter_prompt: None,
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_owner_name(mut self, name: impl Into<String>) -> Self {
        self.owner_name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_starter_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.starter_prompt = Some(prompt.into());
        self
    }

    /// The trimmed starter prompt, if it has any content.
    pub fn effective_prompt(&self) -> Option<&str> {
        self.starter_prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn validate(&self) -> Result<(), TypeError> {
        if self.title.trim().is_empty() {
            return Err(TypeError::MissingField("title"));
        }
        if self.owner_id.as_str().trim().is_empty() {
            return Err(TypeError::MissingField("ownerId"));
        }
        Ok(())
    }
}

/// Everything needed to add a node to a story.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDraft {
    pub story_id: StoryId,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    pub content: String,
    pub author_id: UserId,
    pub author_name: String,
}

impl NodeDraft {
    pub fn new(
        story_id: impl Into<StoryId>,
        parent_id: Option<NodeId>,
        content: impl Into<String>,
        author_id: impl Into<UserId>,
        author_name: impl Into<String>,
    ) -> Self {
        Self {
            story_id: story_id.into(),
            parent_id,
            content: content.into(),
            author_id: author_id.into(),
            author_name: author_name.into(),
        }
    }

    /// Reject drafts with missing story, content, or author fields.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.story_id.as_str().trim().is_empty() {
            return Err(TypeError::MissingField("storyId"));
        }
        if self.content.trim().is_empty() {
            return Err(TypeError::MissingField("content"));
        }
        if self.author_id.as_str().trim().is_empty() {
            return Err(TypeError::MissingField("authorId"));
        }
        if self.author_name.trim().is_empty() {
            return Err(TypeError::MissingField("authorName"));
        }
        Ok(())
    }
}
