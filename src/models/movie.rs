use serde::{Deserialize, Serialize};

use super::{GenreId, MovieId};

/// A movie in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Running time in minutes
    pub duration_minutes: u32,
    /// Mean of all ratings for this movie, maintained by the catalog
    pub average_rating: Option<f64>,
}

impl Movie {
    /// Creates a movie with no ratings yet
    pub fn new(id: MovieId, title: impl Into<String>, duration_minutes: u32) -> Self {
        Self {
            id,
            title: title.into(),
            duration_minutes,
            average_rating: None,
        }
    }
}

/// A genre a movie can belong to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

impl Genre {
    pub fn new(id: GenreId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Many-to-many link between a movie and a genre
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MovieGenre {
    pub movie_id: MovieId,
    pub genre_id: GenreId,
}
