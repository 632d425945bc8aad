use std::collections::HashMap;

use super::similarity::{SimilarityCalculator, SimilarityMethod};
use super::RatingPredictor;
use crate::{
    db::Snapshot,
    models::{GenreId, InteractionType, MovieId, UserId, MAX_RATING, MIN_RATING},
};

/// Ratings above this value express positive affinity, below it negative
pub const NEUTRAL_RATING: f64 = 5.0;

/// Affinity an interaction expresses toward every genre of the movie
pub fn interaction_weight(kind: InteractionType) -> f64 {
    match kind {
        InteractionType::Like => 0.5,
        InteractionType::Favorite => 0.8,
        InteractionType::Dislike => -0.7,
        InteractionType::Watch => 0.2,
    }
}

/// Affinity a rating expresses, in [-0.8, 1.0]
pub fn rating_weight(value: f64) -> f64 {
    (value - NEUTRAL_RATING) / 5.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentSettings {
    /// Similarity between user and movie genre profiles
    pub method: SimilarityMethod,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            method: SimilarityMethod::Cosine,
        }
    }
}

/// Predicts ratings from how well a movie's genres match a user's genre taste
pub struct ContentEngine<'a> {
    snapshot: &'a Snapshot,
    settings: ContentSettings,
}

impl<'a> ContentEngine<'a> {
    pub fn new(snapshot: &'a Snapshot, settings: ContentSettings) -> Self {
        Self { snapshot, settings }
    }

    /// Average signed affinity per genre, from ratings and interactions
    ///
    /// Each rating or interaction with a non-zero weight adds that weight to every
    /// genre of its movie. Genres no signal reached are absent.
    pub fn user_profile(&self, user_id: UserId) -> HashMap<GenreId, f64> {
        let mut totals: HashMap<GenreId, (f64, u32)> = HashMap::new();

        let rating_signals = self
            .snapshot
            .ratings_of(user_id)
            .iter()
            .map(|r| (r.movie_id, rating_weight(r.value)));
        let interaction_signals = self
            .snapshot
            .interactions_of(user_id)
            .iter()
            .map(|i| (i.movie_id, interaction_weight(i.kind)));

        for (movie_id, weight) in rating_signals.chain(interaction_signals) {
            if weight == 0.0 {
                continue;
            }
            for genre_id in self.snapshot.genres_of(movie_id) {
                let entry = totals.entry(*genre_id).or_insert((0.0, 0));
                entry.0 += weight;
                entry.1 += 1;
            }
        }

        totals
            .into_iter()
            .map(|(genre_id, (sum, count))| (genre_id, sum / f64::from(count)))
            .collect()
    }

    /// Uniform weight over a movie's genres; empty when it has none
    pub fn movie_profile(&self, movie_id: MovieId) -> HashMap<GenreId, f64> {
        let genres = self.snapshot.genres_of(movie_id);
        if genres.is_empty() {
            return HashMap::new();
        }

        let weight = 1.0 / genres.len() as f64;
        genres.iter().map(|genre_id| (*genre_id, weight)).collect()
    }
}

impl RatingPredictor for ContentEngine<'_> {
    fn predict_ratings(&self, user_id: UserId, movie_ids: &[MovieId]) -> HashMap<MovieId, f64> {
        let profile = self.user_profile(user_id);

        if profile.is_empty() {
            tracing::warn!(user_id = %user_id, "No genre preferences found");
            return HashMap::new();
        }

        let mut predictions = HashMap::new();
        for movie_id in movie_ids {
            let movie_profile = self.movie_profile(*movie_id);
            if movie_profile.is_empty() {
                continue;
            }

            let similarity = self.settings.method.similarity(&profile, &movie_profile);
            let predicted = (NEUTRAL_RATING + similarity * 5.0).clamp(MIN_RATING, MAX_RATING);
            predictions.insert(*movie_id, predicted);
        }

        tracing::info!(
            user_id = %user_id,
            genres = profile.len(),
            requested = movie_ids.len(),
            predicted = predictions.len(),
            "Content predictions computed"
        );

        predictions
    }
}
