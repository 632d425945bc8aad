use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::Instrument;
use uuid::Uuid;

use super::collaborative::CollaborativeEngine;
use super::content::ContentEngine;
use super::hybrid::{HybridBlender, HybridSettings};
use super::RatingPredictor;
use crate::{
    db::{CatalogSource, Snapshot},
    error::{AppError, AppResult},
    models::{MovieId, UserId},
};

/// Which prediction engine drives a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Collaborative,
    Content,
    #[default]
    Hybrid,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Collaborative => "collaborative",
            Strategy::Content => "content",
            Strategy::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

impl Strategy {
    /// Builds the engine for this strategy over one snapshot
    pub fn predictor<'a>(
        self,
        snapshot: &'a Snapshot,
        settings: &HybridSettings,
    ) -> Box<dyn RatingPredictor + 'a> {
        match self {
            Strategy::Collaborative => {
                Box::new(CollaborativeEngine::new(snapshot, settings.collaborative))
            }
            Strategy::Content => Box::new(ContentEngine::new(snapshot, settings.content)),
            Strategy::Hybrid => Box::new(HybridBlender::new(snapshot, *settings)),
        }
    }
}

/// Movies the user has neither rated nor watched, in catalog order
pub fn candidate_movies(snapshot: &Snapshot, user_id: UserId) -> Vec<MovieId> {
    let seen: HashSet<MovieId> = snapshot
        .ratings_of(user_id)
        .iter()
        .map(|r| r.movie_id)
        .chain(snapshot.views_of(user_id).iter().map(|v| v.movie_id))
        .collect();

    snapshot
        .movies()
        .iter()
        .map(|m| m.id)
        .filter(|id| !seen.contains(id))
        .collect()
}

/// Shared "predict, rank, truncate" pipeline
///
/// Candidates without a prediction are dropped. Equal scores keep the order the
/// candidates were given in.
pub fn rank_candidates<F>(candidates: &[MovieId], limit: usize, predict: F) -> Vec<MovieId>
where
    F: FnOnce(&[MovieId]) -> HashMap<MovieId, f64>,
{
    let predictions = predict(candidates);

    let mut scored: Vec<(MovieId, f64)> = candidates
        .iter()
        .filter_map(|id| predictions.get(id).map(|score| (*id, *score)))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    scored.into_iter().take(limit).map(|(id, _)| id).collect()
}

fn require_positive_limit(limit: usize) -> AppResult<()> {
    if limit == 0 {
        return Err(AppError::InvalidInput(
            "Limit must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

fn require_user(snapshot: &Snapshot, user_id: UserId) -> AppResult<()> {
    if !snapshot.contains_user(user_id) {
        return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }
    Ok(())
}

/// Recommends from an already loaded snapshot
pub fn recommend_from_snapshot(
    snapshot: &Snapshot,
    settings: &HybridSettings,
    user_id: UserId,
    limit: usize,
    strategy: Strategy,
) -> AppResult<Vec<MovieId>> {
    require_positive_limit(limit)?;
    require_user(snapshot, user_id)?;

    let candidates = candidate_movies(snapshot, user_id);
    let predictor = strategy.predictor(snapshot, settings);

    Ok(rank_candidates(&candidates, limit, |movie_ids| {
        predictor.predict_ratings(user_id, movie_ids)
    }))
}

/// Top-level entry point for personalized recommendations
///
/// Every call loads a fresh [`Snapshot`] from the catalog, so results always
/// reflect the catalog as it is at call time.
pub struct RecommendationService<S: CatalogSource> {
    source: Arc<S>,
    settings: HybridSettings,
}

impl<S: CatalogSource> RecommendationService<S> {
    pub fn new(source: Arc<S>, settings: HybridSettings) -> Self {
        Self { source, settings }
    }

    /// Top `limit` unseen movies for `user_id`, best first
    pub async fn recommend(
        &self,
        user_id: UserId,
        limit: usize,
        strategy: Strategy,
    ) -> AppResult<Vec<MovieId>> {
        let span = tracing::info_span!(
            "recommend",
            call_id = %Uuid::new_v4(),
            user_id = %user_id,
            strategy = %strategy
        );

        self.recommend_in_span(user_id, limit, strategy)
            .instrument(span)
            .await
    }

    /// Predicted scores for the given movies; movies without signal are absent
    pub async fn predict_ratings(
        &self,
        user_id: UserId,
        movie_ids: &[MovieId],
        strategy: Strategy,
    ) -> AppResult<HashMap<MovieId, f64>> {
        let span = tracing::info_span!(
            "predict_ratings",
            call_id = %Uuid::new_v4(),
            user_id = %user_id,
            strategy = %strategy
        );

        self.predict_in_span(user_id, movie_ids, strategy)
            .instrument(span)
            .await
    }

    async fn recommend_in_span(
        &self,
        user_id: UserId,
        limit: usize,
        strategy: Strategy,
    ) -> AppResult<Vec<MovieId>> {
        require_positive_limit(limit)?;

        let snapshot = Snapshot::load(self.source.as_ref()).await?;
        let recommendations =
            recommend_from_snapshot(&snapshot, &self.settings, user_id, limit, strategy)?;

        tracing::info!(
            limit,
            returned = recommendations.len(),
            "Recommendations generated"
        );

        Ok(recommendations)
    }

    async fn predict_in_span(
        &self,
        user_id: UserId,
        movie_ids: &[MovieId],
        strategy: Strategy,
    ) -> AppResult<HashMap<MovieId, f64>> {
        let snapshot = Snapshot::load(self.source.as_ref()).await?;
        require_user(&snapshot, user_id)?;

        let predictor = strategy.predictor(&snapshot, &self.settings);
        let predictions = predictor.predict_ratings(user_id, movie_ids);

        tracing::info!(
            requested = movie_ids.len(),
            predicted = predictions.len(),
            "Ratings predicted"
        );

        Ok(predictions)
    }
}
