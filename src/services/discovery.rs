use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::Instrument;
use uuid::Uuid;

use super::similarity::jaccard;
use crate::{
    db::{CatalogSource, Snapshot},
    error::{AppError, AppResult},
    models::{MovieId, UserId},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscoverySettings {
    /// Rating at or above which a user counts as a fan of a movie
    pub liked_rating_threshold: f64,
    /// Trailing window used when a trending query names none
    pub trending_window_days: u32,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            liked_rating_threshold: 7.0,
            trending_window_days: 30,
        }
    }
}

/// Orders `(movie, score)` pairs best first, keeping input order on ties
fn top_scored(mut scored: Vec<(MovieId, f64)>, limit: usize) -> Vec<MovieId> {
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.into_iter().take(limit).map(|(id, _)| id).collect()
}

/// Movies whose fans overlap most with the fans of `target`
///
/// `fans` lists every movie in catalog order with the users who rated it highly.
/// The target and movies with no overlap are left out.
pub fn rank_similar(
    fans: &[(MovieId, HashSet<UserId>)],
    target: MovieId,
    limit: usize,
) -> Vec<MovieId> {
    let Some((_, target_fans)) = fans.iter().find(|(id, _)| *id == target) else {
        return Vec::new();
    };

    let scored = fans
        .iter()
        .filter(|(id, _)| *id != target)
        .map(|(id, others)| (*id, jaccard(target_fans, others)))
        .filter(|(_, score)| *score > 0.0)
        .collect();

    top_scored(scored, limit)
}

/// Movies with the most views in the `window_days` leading up to `now`
///
/// Movies nobody watched in the window are left out. A window reaching past the
/// earliest representable time counts every view.
pub fn rank_trending(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    window_days: u32,
    limit: usize,
) -> Vec<MovieId> {
    let cutoff = Duration::try_days(i64::from(window_days))
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut views: HashMap<MovieId, u32> = HashMap::new();
    for user in snapshot.users() {
        for view in snapshot.views_of(user.id) {
            if view.watched_at >= cutoff {
                *views.entry(view.movie_id).or_insert(0) += 1;
            }
        }
    }

    let scored = snapshot
        .movies()
        .iter()
        .filter_map(|m| views.get(&m.id).map(|count| (m.id, f64::from(*count))))
        .collect();

    top_scored(scored, limit)
}

/// Non-personalized queries: "more like this" and "trending now"
pub struct DiscoveryService<S: CatalogSource> {
    source: Arc<S>,
    settings: DiscoverySettings,
}

impl<S: CatalogSource> DiscoveryService<S> {
    pub fn new(source: Arc<S>, settings: DiscoverySettings) -> Self {
        Self { source, settings }
    }

    /// Movies liked by the same people who liked `movie_id`
    pub async fn similar_movies(
        &self,
        movie_id: MovieId,
        limit: usize,
    ) -> AppResult<Vec<MovieId>> {
        let span = tracing::info_span!(
            "similar_movies",
            call_id = %Uuid::new_v4(),
            movie_id = %movie_id
        );

        self.similar_in_span(movie_id, limit).instrument(span).await
    }

    /// Most watched movies over the trailing window, defaulting to the configured one
    pub async fn trending_movies(
        &self,
        limit: usize,
        window_days: Option<u32>,
    ) -> AppResult<Vec<MovieId>> {
        let window_days = window_days.unwrap_or(self.settings.trending_window_days);
        let span = tracing::info_span!(
            "trending_movies",
            call_id = %Uuid::new_v4(),
            window_days
        );

        self.trending_in_span(limit, window_days)
            .instrument(span)
            .await
    }

    async fn similar_in_span(&self, movie_id: MovieId, limit: usize) -> AppResult<Vec<MovieId>> {
        require_positive_limit(limit)?;

        let movies = self.source.list_movies().await?;
        if !movies.iter().any(|m| m.id == movie_id) {
            return Err(AppError::NotFound(format!("Movie {} not found", movie_id)));
        }

        let threshold = self.settings.liked_rating_threshold;
        let mut fans = Vec::with_capacity(movies.len());
        for movie in &movies {
            let liked_by: HashSet<UserId> = self
                .source
                .movie_ratings(movie.id)
                .await?
                .into_iter()
                .filter(|r| r.value >= threshold)
                .map(|r| r.user_id)
                .collect();
            fans.push((movie.id, liked_by));
        }

        let similar = rank_similar(&fans, movie_id, limit);
        tracing::info!(limit, returned = similar.len(), "Similar movies ranked");

        Ok(similar)
    }

    async fn trending_in_span(&self, limit: usize, window_days: u32) -> AppResult<Vec<MovieId>> {
        require_positive_limit(limit)?;
        if window_days == 0 {
            return Err(AppError::InvalidInput(
                "Trending window must be at least one day".to_string(),
            ));
        }

        let snapshot = Snapshot::load(self.source.as_ref()).await?;
        let trending = rank_trending(&snapshot, Utc::now(), window_days, limit);
        tracing::info!(limit, returned = trending.len(), "Trending movies ranked");

        Ok(trending)
    }
}

fn require_positive_limit(limit: usize) -> AppResult<()> {
    if limit == 0 {
        return Err(AppError::InvalidInput(
            "Limit must be a positive integer".to_string(),
        ));
    }
    Ok(())
}
