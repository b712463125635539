use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing backend identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Wrap an identifier, rejecting empty or blank strings.
            pub fn parse(id: &str) -> Result<Self, TypeError> {
                let trimmed = id.trim();
                if trimmed.is_empty() {
                    return Err(TypeError::EmptyId);
                }
                Ok(Self(trimmed.to_string()))
            }

            /// The identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Short representation (first 8 characters) for logs.
            pub fn short_id(&self) -> &str {
                match self.0.char_indices().nth(8) {
                    Some((idx, _)) => &self.0[..idx],
                    None => &self.0,
                }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifier of a [`Story`](crate::Story) document.
    StoryId
);

string_id!(
    /// Identifier of a [`StoryNode`](crate::StoryNode) document.
    NodeId
);

string_id!(
    /// Identity of an author or voter, as issued by the auth provider.
    UserId
);

impl StoryId {
    /// Generate a new time-ordered story ID (UUID v7).
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }
}

impl NodeId {
    /// Generate a new time-ordered node ID (UUID v7).
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = NodeId::generate();
        let b = NodeId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn parse_rejects_blank() {
        assert_eq!(StoryId::parse("   "), Err(TypeError::EmptyId));
        assert_eq!(StoryId::parse(" s1 ").unwrap().as_str(), "s1");
    }

    #[test]
    fn short_id_truncates() {
        let id = NodeId::new("0123456789abcdef");
        assert_eq!(id.short_id(), "01234567");
        assert_eq!(NodeId::new("r").short_id(), "r");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = UserId::new("alice");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"alice\"");
        let parsed: UserId = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn debug_names_the_kind() {
        assert_eq!(format!("{:?}", NodeId::new("c1")), "NodeId(c1)");
        assert_eq!(format!("{}", NodeId::new("c1")), "c1");
    }
}
