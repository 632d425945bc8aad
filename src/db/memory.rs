use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::CatalogSource;
use crate::{
    error::{AppError, AppResult},
    models::{
        Genre, GenreId, InteractionKind, InteractionType, InteractionTypeId, Movie, MovieGenre,
        MovieId, Rating, User, UserId, UserInteraction, ViewingHistory,
    },
};

/// In-process catalog backing the demo binary and tests
///
/// Cloning is cheap; clones share the same underlying state.
#[derive(Clone)]
pub struct InMemoryCatalog {
    inner: Arc<RwLock<CatalogState>>,
}

/// Inner state that can be modified
#[derive(Default)]
struct CatalogState {
    users: Vec<User>,
    movies: Vec<Movie>,
    genres: HashMap<GenreId, Genre>,
    movie_genres: Vec<MovieGenre>,
    ratings: Vec<Rating>,
    interaction_kinds: Vec<InteractionKind>,
    interactions: Vec<UserInteraction>,
    views: Vec<ViewingHistory>,
}

impl CatalogState {
    fn has_user(&self, user_id: UserId) -> bool {
        self.users.iter().any(|u| u.id == user_id)
    }

    fn has_movie(&self, movie_id: MovieId) -> bool {
        self.movies.iter().any(|m| m.id == movie_id)
    }

    fn require_user_and_movie(&self, user_id: UserId, movie_id: MovieId) -> AppResult<()> {
        if !self.has_user(user_id) {
            return Err(AppError::NotFound(format!("User {}", user_id)));
        }
        if !self.has_movie(movie_id) {
            return Err(AppError::NotFound(format!("Movie {}", movie_id)));
        }
        Ok(())
    }

    /// Keeps a movie's running average in step with its ratings.
    /// Called explicitly after every rating write.
    fn on_rating_written(&mut self, movie_id: MovieId) {
        let values: Vec<f64> = self
            .ratings
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .map(|r| r.value)
            .collect();

        let average = if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        };

        if let Some(movie) = self.movies.iter_mut().find(|m| m.id == movie_id) {
            movie.average_rating = average;
        }
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalog {
    /// Creates an empty catalog with the four standard interaction types registered
    /// under ids 1 through 4
    pub fn new() -> Self {
        let interaction_kinds = [
            InteractionType::Like,
            InteractionType::Favorite,
            InteractionType::Dislike,
            InteractionType::Watch,
        ]
        .into_iter()
        .enumerate()
        .map(|(i, kind)| InteractionKind {
            id: InteractionTypeId(i as u64 + 1),
            kind,
        })
        .collect();

        Self {
            inner: Arc::new(RwLock::new(CatalogState {
                interaction_kinds,
                ..CatalogState::default()
            })),
        }
    }

    /// Adds a user, or replaces the one with the same id in its listing slot
    pub async fn add_user(&self, user: User) {
        let mut state = self.inner.write().await;
        match state.users.iter().position(|u| u.id == user.id) {
            Some(slot) => state.users[slot] = user,
            None => state.users.push(user),
        }
    }

    /// Adds a movie, or replaces the one with the same id in its listing slot.
    /// The average is always derived from stored ratings, never taken from `movie`.
    pub async fn add_movie(&self, movie: Movie) {
        let mut state = self.inner.write().await;
        let movie_id = movie.id;
        match state.movies.iter().position(|m| m.id == movie_id) {
            Some(slot) => state.movies[slot] = movie,
            None => state.movies.push(movie),
        }
        state.on_rating_written(movie_id);
    }

    pub async fn add_genre(&self, genre: Genre) {
        let mut state = self.inner.write().await;
        state.genres.insert(genre.id, genre);
    }

    /// Attaches a genre to a movie; linking twice is a no-op
    pub async fn link_genre(&self, movie_id: MovieId, genre_id: GenreId) -> AppResult<()> {
        let mut state = self.inner.write().await;
        if !state.has_movie(movie_id) {
            return Err(AppError::NotFound(format!("Movie {}", movie_id)));
        }
        if !state.genres.contains_key(&genre_id) {
            return Err(AppError::NotFound(format!("Genre {}", genre_id)));
        }

        let link = MovieGenre { movie_id, genre_id };
        if !state.movie_genres.contains(&link) {
            state.movie_genres.push(link);
        }
        Ok(())
    }

    /// Records a rating, replacing any earlier rating by the same user for the same movie
    pub async fn upsert_rating(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        value: f64,
    ) -> AppResult<()> {
        let rating = Rating::new(user_id, movie_id, value)?;

        let mut state = self.inner.write().await;
        state.require_user_and_movie(user_id, movie_id)?;

        let existing = state
            .ratings
            .iter()
            .position(|r| r.user_id == user_id && r.movie_id == movie_id);
        match existing {
            Some(index) => state.ratings[index] = rating,
            None => state.ratings.push(rating),
        }

        state.on_rating_written(movie_id);

        tracing::debug!(user_id = %user_id, movie_id = %movie_id, value, "Rating stored");
        Ok(())
    }

    /// Records an interaction; the same user may interact with a movie several times
    pub async fn record_interaction(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        kind: InteractionType,
    ) -> AppResult<()> {
        let mut state = self.inner.write().await;
        state.require_user_and_movie(user_id, movie_id)?;

        let interaction_type_id = state
            .interaction_kinds
            .iter()
            .find(|k| k.kind == kind)
            .map(|k| k.id)
            .ok_or_else(|| AppError::NotFound(format!("Interaction type {}", kind)))?;

        state.interactions.push(UserInteraction {
            user_id,
            movie_id,
            interaction_type_id,
        });
        Ok(())
    }

    pub async fn record_view(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        watched_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut state = self.inner.write().await;
        state.require_user_and_movie(user_id, movie_id)?;

        state.views.push(ViewingHistory {
            user_id,
            movie_id,
            watched_at,
        });
        Ok(())
    }

    pub async fn movie(&self, movie_id: MovieId) -> Option<Movie> {
        let state = self.inner.read().await;
        state.movies.iter().find(|m| m.id == movie_id).cloned()
    }
}

#[async_trait::async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn list_movies(&self) -> AppResult<Vec<Movie>> {
        Ok(self.inner.read().await.movies.clone())
    }

    async fn genres_for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Genre>> {
        let state = self.inner.read().await;
        Ok(state
            .movie_genres
            .iter()
            .filter(|link| link.movie_id == movie_id)
            .filter_map(|link| state.genres.get(&link.genre_id).cloned())
            .collect())
    }

    async fn user_ratings(&self, user_id: UserId) -> AppResult<Vec<Rating>> {
        let state = self.inner.read().await;
        Ok(state
            .ratings
            .iter()
            .filter(|r| r.user_id == user_id)
            .copied()
            .collect())
    }

    async fn viewing_history(&self, user_id: UserId) -> AppResult<Vec<ViewingHistory>> {
        let state = self.inner.read().await;
        Ok(state
            .views
            .iter()
            .filter(|v| v.user_id == user_id)
            .copied()
            .collect())
    }

    async fn user_interactions(&self, user_id: UserId) -> AppResult<Vec<UserInteraction>> {
        let state = self.inner.read().await;
        Ok(state
            .interactions
            .iter()
            .filter(|i| i.user_id == user_id)
            .copied()
            .collect())
    }

    async fn movie_ratings(&self, movie_id: MovieId) -> AppResult<Vec<Rating>> {
        let state = self.inner.read().await;
        Ok(state
            .ratings
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .copied()
            .collect())
    }

    async fn interaction_type(
        &self,
        id: InteractionTypeId,
    ) -> AppResult<Option<InteractionType>> {
        let state = self.inner.read().await;
        Ok(state
            .interaction_kinds
            .iter()
            .find(|k| k.id == id)
            .map(|k| k.kind))
    }
}
