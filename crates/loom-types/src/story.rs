use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::{StoryId, UserId};

/// Who can discover a story.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
        }
    }
}

impl FromStr for Visibility {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(TypeError::UnknownVisibility(other.to_string())),
        }
    }
}

/// A collaborative narrative.
///
/// `node_count` is a denormalized counter kept by the store on every node
/// creation and deletion; it is eventually consistent with the node
/// collection, not enforced by the graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    /// Free-text category.
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub visibility: Visibility,
    pub owner_id: UserId,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starter_prompt: Option<String>,
    #[serde(default)]
    pub contributors: BTreeSet<UserId>,
    #[serde(default)]
    pub node_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Story {
    /// Returns `true` if anyone may discover this story.
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Record a contribution by `user`: the author joins the contributor set.
    /// Returns `true` if the author was new.
    pub fn add_contributor(&mut self, user: &UserId) -> bool {
        self.contributors.insert(user.clone())
    }

    /// Bump `updated_at` to now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story() -> Story {
        let now = Utc::now();
        Story {
            id: StoryId::new("s1"),
            title: "The Lighthouse".into(),
            genre: "mystery".into(),
            visibility: Visibility::Public,
            owner_id: UserId::new("alice"),
            owner_name: "Alice".into(),
            description: None,
            starter_prompt: None,
            contributors: BTreeSet::from([UserId::new("alice")]),
            node_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn contributors_have_set_semantics() {
        let mut s = story();
        assert!(!s.add_contributor(&UserId::new("alice")));
        assert!(s.add_contributor(&UserId::new("bob")));
        assert_eq!(s.contributors.len(), 2);
    }

    #[test]
    fn visibility_parses_case_insensitively() {
        assert_eq!("Private".parse::<Visibility>().unwrap(), Visibility::Private);
        assert!(matches!(
            "friends".parse::<Visibility>(),
            Err(TypeError::UnknownVisibility(_))
        ));
    }

    #[test]
    fn json_uses_backend_field_names() {
        let json = serde_json::to_value(story()).unwrap();
        assert_eq!(json["ownerId"], "alice");
        assert_eq!(json["visibility"], "public");
        assert_eq!(json["nodeCount"], 0);
        assert!(json.get("starterPrompt").is_none());
    }
}
