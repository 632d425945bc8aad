use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MovieId, UserId};
use crate::error::{AppError, AppResult};

/// Lowest rating a user can give
pub const MIN_RATING: f64 = 1.0;
/// Highest rating a user can give
pub const MAX_RATING: f64 = 10.0;

/// A user of the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

/// An explicit rating of a movie by a user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub value: f64,
}

impl Rating {
    /// Creates a rating, rejecting values outside [`MIN_RATING`, `MAX_RATING`]
    pub fn new(user_id: UserId, movie_id: MovieId, value: f64) -> AppResult<Self> {
        if !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(AppError::InvalidInput(format!(
                "Rating {} for movie {} is outside [{}, {}]",
                value, movie_id, MIN_RATING, MAX_RATING
            )));
        }

        Ok(Self {
            user_id,
            movie_id,
            value,
        })
    }
}

/// Evidence that a user watched a movie at a point in time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewingHistory {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub watched_at: DateTime<Utc>,
}
