use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::CatalogSource;
use crate::{
    error::AppResult,
    models::{
        GenreId, InteractionType, InteractionTypeId, Movie, MovieId, Rating, User, UserId,
        ViewingHistory,
    },
};

/// An interaction with its type id already resolved to a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedInteraction {
    pub movie_id: MovieId,
    pub kind: InteractionType,
}

/// Materialized, read-only view of the catalog for a single recommendation call
///
/// Built once per call and dropped afterwards, so nothing computed from it can go
/// stale between calls.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    users: Vec<User>,
    movies: Vec<Movie>,
    movie_genres: HashMap<MovieId, Vec<GenreId>>,
    ratings: HashMap<UserId, Vec<Rating>>,
    interactions: HashMap<UserId, Vec<ResolvedInteraction>>,
    views: HashMap<UserId, Vec<ViewingHistory>>,
}

impl Snapshot {
    /// Reads everything the engines need from the catalog
    pub async fn load<S: CatalogSource + ?Sized>(source: &S) -> AppResult<Self> {
        let users = source.list_users().await?;
        let movies = source.list_movies().await?;

        let mut movie_genres = HashMap::with_capacity(movies.len());
        for movie in &movies {
            let genres = source.genres_for_movie(movie.id).await?;
            movie_genres.insert(movie.id, genres.into_iter().map(|g| g.id).collect());
        }

        // Type ids repeat across users; resolve each one once per load
        let mut kinds: HashMap<InteractionTypeId, Option<InteractionType>> = HashMap::new();
        let mut ratings = HashMap::with_capacity(users.len());
        let mut interactions = HashMap::with_capacity(users.len());
        let mut views = HashMap::with_capacity(users.len());

        for user in &users {
            ratings.insert(user.id, source.user_ratings(user.id).await?);
            views.insert(user.id, source.viewing_history(user.id).await?);

            let mut resolved = Vec::new();
            for record in source.user_interactions(user.id).await? {
                let kind = match kinds.get(&record.interaction_type_id) {
                    Some(kind) => *kind,
                    None => {
                        let kind = source.interaction_type(record.interaction_type_id).await?;
                        kinds.insert(record.interaction_type_id, kind);
                        kind
                    }
                };

                match kind {
                    Some(kind) => resolved.push(ResolvedInteraction {
                        movie_id: record.movie_id,
                        kind,
                    }),
                    None => tracing::warn!(
                        user_id = %user.id,
                        interaction_type_id = %record.interaction_type_id,
                        "Dropping interaction with unknown type"
                    ),
                }
            }
            interactions.insert(user.id, resolved);
        }

        tracing::debug!(
            users = users.len(),
            movies = movies.len(),
            "Catalog snapshot loaded"
        );

        Ok(Self {
            users,
            movies,
            movie_genres,
            ratings,
            interactions,
            views,
        })
    }

    /// Starts an empty snapshot for assembling data by hand
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn contains_user(&self, user_id: UserId) -> bool {
        self.users.iter().any(|u| u.id == user_id)
    }

    pub fn genres_of(&self, movie_id: MovieId) -> &[GenreId] {
        self.movie_genres
            .get(&movie_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn ratings_of(&self, user_id: UserId) -> &[Rating] {
        self.ratings.get(&user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn interactions_of(&self, user_id: UserId) -> &[ResolvedInteraction] {
        self.interactions
            .get(&user_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn views_of(&self, user_id: UserId) -> &[ViewingHistory] {
        self.views.get(&user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// movieId -> rating value for one user
    pub fn rating_vector(&self, user_id: UserId) -> HashMap<MovieId, f64> {
        self.ratings_of(user_id)
            .iter()
            .map(|r| (r.movie_id, r.value))
            .collect()
    }
}

/// Hand assembly of a [`Snapshot`], mostly for tests and fixtures
///
/// Unlike the catalog, the builder does not validate anything: ratings are taken
/// as given and users referenced only by ratings are not registered implicitly.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    pub fn user(mut self, id: u64) -> Self {
        self.snapshot
            .users
            .push(User::new(UserId(id), format!("user{}", id)));
        self
    }

    pub fn movie(mut self, id: u64, genres: &[u64]) -> Self {
        let movie_id = MovieId(id);
        self.snapshot
            .movies
            .push(Movie::new(movie_id, format!("Movie {}", id), 120));
        self.snapshot
            .movie_genres
            .insert(movie_id, genres.iter().copied().map(GenreId).collect());
        self
    }

    pub fn rating(mut self, user: u64, movie: u64, value: f64) -> Self {
        self.snapshot
            .ratings
            .entry(UserId(user))
            .or_default()
            .push(Rating {
                user_id: UserId(user),
                movie_id: MovieId(movie),
                value,
            });
        self
    }

    pub fn interaction(mut self, user: u64, movie: u64, kind: InteractionType) -> Self {
        self.snapshot
            .interactions
            .entry(UserId(user))
            .or_default()
            .push(ResolvedInteraction {
                movie_id: MovieId(movie),
                kind,
            });
        self
    }

    pub fn view(mut self, user: u64, movie: u64, watched_at: DateTime<Utc>) -> Self {
        self.snapshot
            .views
            .entry(UserId(user))
            .or_default()
            .push(ViewingHistory {
                user_id: UserId(user),
                movie_id: MovieId(movie),
                watched_at,
            });
        self
    }

    pub fn build(self) -> Snapshot {
        self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MockCatalogSource,
        error::AppError,
        models::{Genre, UserInteraction},
    };

    fn mock_with_one_user() -> MockCatalogSource {
        let mut source = MockCatalogSource::new();
        source
            .expect_list_users()
            .returning(|| Ok(vec![User::new(UserId(1), "johndoe")]));
        source
            .expect_list_movies()
            .returning(|| Ok(vec![Movie::new(MovieId(10), "The Matrix", 136)]));
        source
            .expect_genres_for_movie()
            .returning(|_| Ok(vec![Genre::new(GenreId(2), "Sci-Fi")]));
        source.expect_user_ratings().returning(|user_id| {
            Ok(vec![Rating {
                user_id,
                movie_id: MovieId(10),
                value: 9.0,
            }])
        });
        source.expect_viewing_history().returning(|_| Ok(vec![]));
        source
    }

    #[test]
    fn test_builder_accessors() {
        let snapshot = Snapshot::builder()
            .user(1)
            .movie(10, &[1, 2])
            .rating(1, 10, 8.0)
            .interaction(1, 10, InteractionType::Like)
            .build();

        assert!(snapshot.contains_user(UserId(1)));
        assert!(!snapshot.contains_user(UserId(2)));
        assert_eq!(snapshot.genres_of(MovieId(10)), &[GenreId(1), GenreId(2)]);
        assert!(snapshot.genres_of(MovieId(99)).is_empty());
        assert_eq!(snapshot.rating_vector(UserId(1)).get(&MovieId(10)), Some(&8.0));
        assert_eq!(snapshot.interactions_of(UserId(1)).len(), 1);
        assert!(snapshot.views_of(UserId(1)).is_empty());
    }

    #[tokio::test]
    async fn test_load_resolves_interaction_types_once() {
        let mut source = mock_with_one_user();
        source.expect_user_interactions().returning(|user_id| {
            Ok(vec![
                UserInteraction {
                    user_id,
                    movie_id: MovieId(10),
                    interaction_type_id: InteractionTypeId(1),
                },
                UserInteraction {
                    user_id,
                    movie_id: MovieId(11),
                    interaction_type_id: InteractionTypeId(1),
                },
            ])
        });
        source
            .expect_interaction_type()
            .times(1)
            .returning(|_| Ok(Some(InteractionType::Like)));

        let snapshot = Snapshot::load(&source).await.unwrap();

        assert_eq!(snapshot.interactions_of(UserId(1)).len(), 2);
        assert_eq!(snapshot.genres_of(MovieId(10)), &[GenreId(2)]);
        assert_eq!(snapshot.ratings_of(UserId(1)).len(), 1);
    }

    #[tokio::test]
    async fn test_load_drops_unknown_interaction_types() {
        let mut source = mock_with_one_user();
        source.expect_user_interactions().returning(|user_id| {
            Ok(vec![UserInteraction {
                user_id,
                movie_id: MovieId(10),
                interaction_type_id: InteractionTypeId(99),
            }])
        });
        source.expect_interaction_type().returning(|_| Ok(None));

        let snapshot = Snapshot::load(&source).await.unwrap();

        assert!(snapshot.interactions_of(UserId(1)).is_empty());
    }

    #[tokio::test]
    async fn test_load_propagates_source_errors() {
        let mut source = MockCatalogSource::new();
        source
            .expect_list_users()
            .returning(|| Err(AppError::DataAccess("connection refused".to_string())));

        let result = Snapshot::load(&source).await;

        assert_eq!(
            result.unwrap_err(),
            AppError::DataAccess("connection refused".to_string())
        );
    }
}
