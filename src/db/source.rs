use crate::{
    error::AppResult,
    models::{
        Genre, InteractionType, InteractionTypeId, Movie, MovieId, Rating, User, UserId,
        UserInteraction, ViewingHistory,
    },
};

/// Read-only access to catalog data
///
/// The recommendation core never writes through this trait. Implementations own
/// persistence; any error they return is handed back to the caller unchanged.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// All users, in a stable listing order
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// All movies, in a stable listing order
    async fn list_movies(&self) -> AppResult<Vec<Movie>>;

    /// Genres attached to a movie
    async fn genres_for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Genre>>;

    /// Explicit ratings left by a user
    async fn user_ratings(&self, user_id: UserId) -> AppResult<Vec<Rating>>;

    /// Movies a user has watched
    async fn viewing_history(&self, user_id: UserId) -> AppResult<Vec<ViewingHistory>>;

    /// Interaction records left by a user
    async fn user_interactions(&self, user_id: UserId) -> AppResult<Vec<UserInteraction>>;

    /// Every rating a movie has received
    async fn movie_ratings(&self, movie_id: MovieId) -> AppResult<Vec<Rating>>;

    /// Resolves an interaction-type id to its tag
    async fn interaction_type(&self, id: InteractionTypeId)
        -> AppResult<Option<InteractionType>>;
}
