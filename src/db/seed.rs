//! Deterministic sample catalog for the demo binary and integration tests
//!
//! Four users with recognizable tastes plus one brand-new user:
//! - `johndoe` (1): action / sci-fi, dislikes comedy
//! - `janesmith` (2): rates like johndoe, has seen more sci-fi
//! - `michaelmiller` (3): drama and romance
//! - `emmadavis` (4): horror fan
//! - `newbie` (5): no ratings, interactions, or views

use chrono::{DateTime, Duration, Utc};

use super::InMemoryCatalog;
use crate::{
    error::AppResult,
    models::{Genre, GenreId, InteractionType, Movie, MovieId, User, UserId},
};

const GENRES: &[(u64, &str)] = &[
    (1, "Action"),
    (2, "Sci-Fi"),
    (3, "Drama"),
    (4, "Comedy"),
    (5, "Horror"),
    (6, "Romance"),
];

const MOVIES: &[(u64, &str, u32, &[u64])] = &[
    (1, "The Matrix", 136, &[1, 2]),
    (2, "Inception", 148, &[1, 2]),
    (3, "Interstellar", 169, &[2, 3]),
    (4, "The Godfather", 175, &[3]),
    (5, "Forrest Gump", 142, &[3, 6]),
    (6, "The Hangover", 100, &[4]),
    (7, "Superbad", 113, &[4]),
    (8, "The Shining", 146, &[5, 3]),
    (9, "Get Out", 104, &[5]),
    (10, "Mad Max: Fury Road", 120, &[1]),
    (11, "Blade Runner 2049", 164, &[2, 3]),
    (12, "The Notebook", 123, &[6, 3]),
];

const USERS: &[(u64, &str)] = &[
    (1, "johndoe"),
    (2, "janesmith"),
    (3, "michaelmiller"),
    (4, "emmadavis"),
    (5, "newbie"),
];

/// (user, movie, rating)
const RATINGS: &[(u64, u64, f64)] = &[
    (1, 1, 9.0),
    (1, 2, 8.5),
    (1, 4, 6.0),
    (1, 6, 3.0),
    (2, 1, 9.5),
    (2, 2, 8.0),
    (2, 4, 6.5),
    (2, 6, 2.5),
    (2, 3, 9.0),
    (2, 10, 8.5),
    (2, 11, 8.0),
    (3, 4, 9.5),
    (3, 5, 9.0),
    (3, 12, 8.0),
    (3, 6, 4.0),
    (3, 1, 5.0),
    (4, 8, 9.5),
    (4, 9, 9.0),
    (4, 6, 3.0),
    (4, 1, 4.0),
];

/// (user, movie, interaction)
const INTERACTIONS: &[(u64, u64, InteractionType)] = &[
    (1, 1, InteractionType::Like),
    (1, 2, InteractionType::Favorite),
    (1, 6, InteractionType::Dislike),
    (2, 1, InteractionType::Like),
    (2, 2, InteractionType::Favorite),
    (2, 6, InteractionType::Dislike),
    (2, 3, InteractionType::Favorite),
    (2, 11, InteractionType::Like),
    (3, 4, InteractionType::Favorite),
    (3, 5, InteractionType::Like),
    (4, 8, InteractionType::Favorite),
    (4, 9, InteractionType::Like),
    (4, 7, InteractionType::Dislike),
];

/// (user, movie, days before `now`)
const VIEWS: &[(u64, u64, i64)] = &[
    (1, 1, 3),
    (1, 2, 5),
    (1, 7, 10),
    (2, 1, 2),
    (2, 3, 4),
    (2, 11, 40),
    (3, 4, 1),
    (3, 5, 6),
    (3, 1, 60),
    (4, 8, 1),
    (4, 9, 2),
    (4, 1, 7),
];

/// Builds the sample catalog with viewing history relative to the current time
pub async fn demo_catalog() -> AppResult<InMemoryCatalog> {
    demo_catalog_at(Utc::now()).await
}

/// Builds the sample catalog with viewing history relative to `now`
pub async fn demo_catalog_at(now: DateTime<Utc>) -> AppResult<InMemoryCatalog> {
    let catalog = InMemoryCatalog::new();

    for (id, name) in GENRES {
        catalog.add_genre(Genre::new(GenreId(*id), *name)).await;
    }

    for (id, title, duration, genres) in MOVIES {
        catalog.add_movie(Movie::new(MovieId(*id), *title, *duration)).await;
        for genre in *genres {
            catalog.link_genre(MovieId(*id), GenreId(*genre)).await?;
        }
    }

    for (id, username) in USERS {
        catalog.add_user(User::new(UserId(*id), *username)).await;
    }

    for (user, movie, value) in RATINGS {
        catalog
            .upsert_rating(UserId(*user), MovieId(*movie), *value)
            .await?;
    }

    for (user, movie, kind) in INTERACTIONS {
        catalog
            .record_interaction(UserId(*user), MovieId(*movie), *kind)
            .await?;
    }

    for (user, movie, days_ago) in VIEWS {
        catalog
            .record_view(UserId(*user), MovieId(*movie), now - Duration::days(*days_ago))
            .await?;
    }

    tracing::info!(
        movies = MOVIES.len(),
        users = USERS.len(),
        ratings = RATINGS.len(),
        "Demo catalog seeded"
    );

    Ok(catalog)
}
