use std::collections::{HashMap, HashSet};

use super::similarity::{jaccard, SimilarityCalculator, SimilarityMethod};
use super::RatingPredictor;
use crate::{
    db::Snapshot,
    models::{InteractionType, MovieId, UserId},
};

/// Share of the combined similarity taken from rating correlation
pub const RATING_SIMILARITY_WEIGHT: f64 = 0.8;
/// Share of the combined similarity taken from interaction overlap
pub const INTERACTION_SIMILARITY_WEIGHT: f64 = 0.2;

const LIKED_OVERLAP_WEIGHT: f64 = 0.6;
const DISLIKED_OVERLAP_WEIGHT: f64 = 0.4;

/// Neighbors at or below this similarity contribute explicit ratings only
pub const IMPLICIT_SIMILARITY_FLOOR: f64 = 0.4;
/// Similarity discount applied to implicit ratings
pub const IMPLICIT_WEIGHT_FACTOR: f64 = 0.5;

/// Tuning knobs for user-user collaborative filtering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollaborativeSettings {
    /// Similarity applied to rating vectors
    pub method: SimilarityMethod,
    /// Size of the neighborhood (K)
    pub neighbor_count: usize,
    /// Combined similarity a user must exceed to become a neighbor
    pub similarity_threshold: f64,
}

impl Default for CollaborativeSettings {
    fn default() -> Self {
        Self {
            method: SimilarityMethod::Pearson,
            neighbor_count: 10,
            similarity_threshold: 0.1,
        }
    }
}

/// A similar user and how similar they are
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub user_id: UserId,
    pub similarity: f64,
}

/// Rating implied by an interaction when no explicit rating exists.
/// WATCH carries no preference and implies nothing.
pub fn implicit_rating(kind: InteractionType) -> Option<f64> {
    match kind {
        InteractionType::Favorite => Some(8.0),
        InteractionType::Like => Some(7.0),
        InteractionType::Dislike => Some(3.0),
        InteractionType::Watch => None,
    }
}

/// Lower is stronger; WATCH never wins
fn interaction_priority(kind: InteractionType) -> Option<u8> {
    match kind {
        InteractionType::Favorite => Some(0),
        InteractionType::Like => Some(1),
        InteractionType::Dislike => Some(2),
        InteractionType::Watch => None,
    }
}

/// Movies a user liked or favorited, and movies they disliked
struct InteractionSets {
    liked: HashSet<MovieId>,
    disliked: HashSet<MovieId>,
}

/// Predicts ratings from the ratings and interactions of behaviorally similar users
pub struct CollaborativeEngine<'a> {
    snapshot: &'a Snapshot,
    settings: CollaborativeSettings,
}

impl<'a> CollaborativeEngine<'a> {
    pub fn new(snapshot: &'a Snapshot, settings: CollaborativeSettings) -> Self {
        Self { snapshot, settings }
    }

    /// Finds the top-K users most similar to `user_id`
    ///
    /// Candidates are scored `0.8 * rating similarity + 0.2 * interaction similarity`
    /// and kept only above the threshold. Users whose rating similarity alone is
    /// under half the threshold are dropped before interaction overlap is computed.
    /// Ties keep the catalog's user listing order.
    pub fn find_neighbors(&self, user_id: UserId) -> Vec<Neighbor> {
        let threshold = self.settings.similarity_threshold;
        let target_ratings = self.snapshot.rating_vector(user_id);
        let target_sets = self.interaction_sets(user_id);

        let mut neighbors: Vec<Neighbor> = Vec::new();

        for other in self.snapshot.users() {
            if other.id == user_id {
                continue;
            }

            let other_ratings = self.snapshot.rating_vector(other.id);
            if other_ratings.is_empty() {
                continue;
            }

            let rating_similarity = self
                .settings
                .method
                .similarity(&target_ratings, &other_ratings);
            if rating_similarity < threshold / 2.0 {
                continue;
            }

            let other_sets = self.interaction_sets(other.id);
            let interaction_similarity = jaccard(&target_sets.liked, &other_sets.liked)
                * LIKED_OVERLAP_WEIGHT
                + jaccard(&target_sets.disliked, &other_sets.disliked) * DISLIKED_OVERLAP_WEIGHT;

            let combined = rating_similarity * RATING_SIMILARITY_WEIGHT
                + interaction_similarity * INTERACTION_SIMILARITY_WEIGHT;

            tracing::debug!(
                user_id = %user_id,
                other_id = %other.id,
                rating_similarity,
                interaction_similarity,
                combined,
                "Scored candidate neighbor"
            );

            if combined > threshold {
                neighbors.push(Neighbor {
                    user_id: other.id,
                    similarity: combined,
                });
            }
        }

        neighbors.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        neighbors.truncate(self.settings.neighbor_count);
        neighbors
    }

    fn interaction_sets(&self, user_id: UserId) -> InteractionSets {
        let mut sets = InteractionSets {
            liked: HashSet::new(),
            disliked: HashSet::new(),
        };

        for interaction in self.snapshot.interactions_of(user_id) {
            match interaction.kind {
                InteractionType::Like | InteractionType::Favorite => {
                    sets.liked.insert(interaction.movie_id);
                }
                InteractionType::Dislike => {
                    sets.disliked.insert(interaction.movie_id);
                }
                InteractionType::Watch => {}
            }
        }

        sets
    }

    /// Strongest preference-bearing interaction a user left on a movie
    fn significant_interaction(
        &self,
        user_id: UserId,
        movie_id: MovieId,
    ) -> Option<InteractionType> {
        self.snapshot
            .interactions_of(user_id)
            .iter()
            .filter(|i| i.movie_id == movie_id)
            .filter_map(|i| interaction_priority(i.kind).map(|p| (p, i.kind)))
            .min_by_key(|(priority, _)| *priority)
            .map(|(_, kind)| kind)
    }

    fn predict_one(
        &self,
        movie_id: MovieId,
        neighbors: &[(Neighbor, HashMap<MovieId, f64>)],
    ) -> Option<f64> {
        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;

        for (neighbor, ratings) in neighbors {
            if let Some(rating) = ratings.get(&movie_id) {
                weighted_sum += neighbor.similarity * rating;
                weight_sum += neighbor.similarity.abs();
            } else if neighbor.similarity > IMPLICIT_SIMILARITY_FLOOR {
                let implied = self
                    .significant_interaction(neighbor.user_id, movie_id)
                    .and_then(implicit_rating);

                if let Some(rating) = implied {
                    let similarity = neighbor.similarity * IMPLICIT_WEIGHT_FACTOR;
                    weighted_sum += similarity * rating;
                    weight_sum += similarity.abs();
                }
            }
        }

        if weight_sum == 0.0 {
            return None;
        }
        Some(weighted_sum / weight_sum)
    }
}

impl RatingPredictor for CollaborativeEngine<'_> {
    fn predict_ratings(&self, user_id: UserId, movie_ids: &[MovieId]) -> HashMap<MovieId, f64> {
        let neighbors = self.find_neighbors(user_id);

        if neighbors.is_empty() {
            tracing::warn!(user_id = %user_id, "No similar users found");
            return HashMap::new();
        }

        let target_ratings = self.snapshot.rating_vector(user_id);
        let neighbors: Vec<(Neighbor, HashMap<MovieId, f64>)> = neighbors
            .into_iter()
            .map(|n| (n, self.snapshot.rating_vector(n.user_id)))
            .collect();

        let predictions: HashMap<MovieId, f64> = movie_ids
            .iter()
            .filter(|movie_id| !target_ratings.contains_key(*movie_id))
            .filter_map(|movie_id| {
                self.predict_one(*movie_id, &neighbors)
                    .map(|rating| (*movie_id, rating))
            })
            .collect();

        tracing::info!(
            user_id = %user_id,
            neighbors = neighbors.len(),
            requested = movie_ids.len(),
            predicted = predictions.len(),
            "Collaborative predictions computed"
        );

        predictions
    }
}
