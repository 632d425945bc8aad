use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod interaction;
pub mod movie;
pub mod user;

pub use interaction::{InteractionKind, InteractionType, UserInteraction};
pub use movie::{Genre, Movie, MovieGenre};
pub use user::{Rating, User, ViewingHistory, MAX_RATING, MIN_RATING};

/// Declares a numeric identifier newtype that displays as its inner value
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a user
    UserId
);
id_type!(
    /// Identifier of a movie
    MovieId
);
id_type!(
    /// Identifier of a genre
    GenreId
);
id_type!(
    /// Identifier of an interaction-type row, resolved to an [`InteractionType`] by the catalog
    InteractionTypeId
);
