use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::{InteractionTypeId, MovieId, UserId};

/// Kind of implicit feedback a user can leave on a movie
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionType {
    Like,
    Favorite,
    Dislike,
    Watch,
}

impl Display for InteractionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InteractionType::Like => "LIKE",
            InteractionType::Favorite => "FAVORITE",
            InteractionType::Dislike => "DISLIKE",
            InteractionType::Watch => "WATCH",
        };
        write!(f, "{}", name)
    }
}

/// Catalog row mapping an interaction-type id to its tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractionKind {
    pub id: InteractionTypeId,
    pub kind: InteractionType,
}

/// A single interaction record; a user may have several per movie
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserInteraction {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub interaction_type_id: InteractionTypeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_type_serialization() {
        let json = serde_json::to_string(&InteractionType::Favorite).unwrap();
        assert_eq!(json, "\"FAVORITE\"");

        let parsed: InteractionType = serde_json::from_str("\"DISLIKE\"").unwrap();
        assert_eq!(parsed, InteractionType::Dislike);
    }

    #[test]
    fn test_interaction_type_display_matches_serde() {
        for kind in [
            InteractionType::Like,
            InteractionType::Favorite,
            InteractionType::Dislike,
            InteractionType::Watch,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }
}
