use std::collections::HashMap;

use serde::Deserialize;

use super::collaborative::{CollaborativeEngine, CollaborativeSettings};
use super::content::{ContentEngine, ContentSettings};
use super::RatingPredictor;
use crate::{
    db::Snapshot,
    error::{AppError, AppResult},
    models::{MovieId, UserId},
};

/// Users with fewer ratings than this lean on content-based predictions
pub const COLD_START_RATINGS: usize = 5;
/// Users with more interactions than this lean on collaborative predictions
pub const RICH_HISTORY_INTERACTIONS: usize = 10;
/// Users with more ratings than this lean further on collaborative predictions
pub const POWER_USER_RATINGS: usize = 20;

const COLD_START_SHIFT: f64 = 0.25;
const RICH_HISTORY_SHIFT: f64 = 0.15;
const POWER_USER_SHIFT: f64 = 0.15;

/// Bounds on the adjusted collaborative weight
pub const MIN_COLLABORATIVE_WEIGHT: f64 = 0.1;
pub const MAX_COLLABORATIVE_WEIGHT: f64 = 0.9;

/// How a movie predicted by only one engine is scored
///
/// `WeightShare` keeps the historical behavior: the lone prediction is multiplied
/// by its engine's weight, so single-source movies score lower than movies both
/// engines agree on. `Renormalize` divides by the weight of the engines that
/// actually produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingleSourcePolicy {
    #[default]
    WeightShare,
    Renormalize,
}

/// Collaborative / content weights that always sum to one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    collaborative: f64,
    content: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            collaborative: 0.5,
            content: 0.5,
        }
    }
}

impl BlendWeights {
    /// Scales two positive weights so they sum to one
    pub fn normalized(collaborative: f64, content: f64) -> AppResult<Self> {
        let valid = |w: f64| w.is_finite() && w >= 0.0;
        let total = collaborative + content;
        if !valid(collaborative) || !valid(content) || total <= 0.0 {
            return Err(AppError::InvalidInput(format!(
                "Blend weights must be non-negative with a positive sum (got {} and {})",
                collaborative, content
            )));
        }

        Ok(Self {
            collaborative: collaborative / total,
            content: content / total,
        })
    }

    fn from_collaborative(collaborative: f64) -> Self {
        Self {
            collaborative,
            content: 1.0 - collaborative,
        }
    }

    pub fn collaborative(&self) -> f64 {
        self.collaborative
    }

    pub fn content(&self) -> f64 {
        self.content
    }
}

/// How much history a user has, as far as blending is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserActivity {
    pub ratings: usize,
    pub interactions: usize,
}

impl UserActivity {
    pub fn of(snapshot: &Snapshot, user_id: UserId) -> Self {
        Self {
            ratings: snapshot.ratings_of(user_id).len(),
            interactions: snapshot.interactions_of(user_id).len(),
        }
    }
}

/// Shifts the base weights toward the engine that suits the user's activity
///
/// Each shift is clamped into [0, 1] as it is applied; the final clamp into
/// [`MIN_COLLABORATIVE_WEIGHT`, `MAX_COLLABORATIVE_WEIGHT`] has the last word.
pub fn adjust_weights(base: BlendWeights, activity: UserActivity) -> BlendWeights {
    let shift = |weight: f64, delta: f64| (weight + delta).clamp(0.0, 1.0);
    let mut collaborative = base.collaborative;

    if activity.ratings < COLD_START_RATINGS {
        collaborative = shift(collaborative, -COLD_START_SHIFT);
    }
    if activity.interactions > RICH_HISTORY_INTERACTIONS {
        collaborative = shift(collaborative, RICH_HISTORY_SHIFT);
    }
    if activity.ratings > POWER_USER_RATINGS {
        collaborative = shift(collaborative, POWER_USER_SHIFT);
    }

    BlendWeights::from_collaborative(
        collaborative.clamp(MIN_COLLABORATIVE_WEIGHT, MAX_COLLABORATIVE_WEIGHT),
    )
}

/// Weighted merge of two prediction maps
pub fn blend(
    collaborative: &HashMap<MovieId, f64>,
    content: &HashMap<MovieId, f64>,
    weights: BlendWeights,
    policy: SingleSourcePolicy,
) -> HashMap<MovieId, f64> {
    // movie -> (weighted score, weight of the engines that scored it)
    let mut accumulated: HashMap<MovieId, (f64, f64)> = HashMap::new();

    let sources = [
        (collaborative, weights.collaborative),
        (content, weights.content),
    ];
    for (predictions, weight) in sources {
        for (movie_id, prediction) in predictions {
            let entry = accumulated.entry(*movie_id).or_insert((0.0, 0.0));
            entry.0 += prediction * weight;
            entry.1 += weight;
        }
    }

    accumulated
        .into_iter()
        .filter_map(|(movie_id, (score, weight))| match policy {
            SingleSourcePolicy::WeightShare => Some((movie_id, score)),
            SingleSourcePolicy::Renormalize if weight > 0.0 => Some((movie_id, score / weight)),
            SingleSourcePolicy::Renormalize => None,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HybridSettings {
    pub base_weights: BlendWeights,
    pub single_source: SingleSourcePolicy,
    pub collaborative: CollaborativeSettings,
    pub content: ContentSettings,
}

/// Blends collaborative and content predictions with activity-adapted weights
pub struct HybridBlender<'a> {
    snapshot: &'a Snapshot,
    settings: HybridSettings,
}

impl<'a> HybridBlender<'a> {
    pub fn new(snapshot: &'a Snapshot, settings: HybridSettings) -> Self {
        Self { snapshot, settings }
    }

    /// Weights that will be used for `user_id` in this snapshot
    pub fn weights_for(&self, user_id: UserId) -> BlendWeights {
        adjust_weights(
            self.settings.base_weights,
            UserActivity::of(self.snapshot, user_id),
        )
    }
}

impl RatingPredictor for HybridBlender<'_> {
    fn predict_ratings(&self, user_id: UserId, movie_ids: &[MovieId]) -> HashMap<MovieId, f64> {
        let weights = self.weights_for(user_id);

        let collaborative = CollaborativeEngine::new(self.snapshot, self.settings.collaborative)
            .predict_ratings(user_id, movie_ids);
        let content = ContentEngine::new(self.snapshot, self.settings.content)
            .predict_ratings(user_id, movie_ids);

        let predictions = blend(&collaborative, &content, weights, self.settings.single_source);

        tracing::info!(
            user_id = %user_id,
            collaborative_weight = weights.collaborative(),
            content_weight = weights.content(),
            collaborative_predictions = collaborative.len(),
            content_predictions = content.len(),
            blended = predictions.len(),
            "Hybrid predictions computed"
        );

        predictions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InteractionType;

    const EPSILON: f64 = 1e-9;

    fn activity(ratings: usize, interactions: usize) -> UserActivity {
        UserActivity {
            ratings,
            interactions,
        }
    }

    fn predictions(entries: &[(u64, f64)]) -> HashMap<MovieId, f64> {
        entries.iter().map(|(id, p)| (MovieId(*id), *p)).collect()
    }

    #[test]
    fn test_normalized_weights_sum_to_one() {
        let weights = BlendWeights::normalized(3.0, 1.0).unwrap();
        assert!((weights.collaborative() - 0.75).abs() < EPSILON);
        assert!((weights.content() - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_normalized_rejects_invalid_weights() {
        assert!(BlendWeights::normalized(0.0, 0.0).is_err());
        assert!(BlendWeights::normalized(-1.0, 2.0).is_err());
        assert!(BlendWeights::normalized(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_cold_start_shifts_toward_content() {
        let weights = adjust_weights(BlendWeights::default(), activity(0, 0));
        assert!((weights.collaborative() - 0.25).abs() < EPSILON);
        assert!((weights.content() - 0.75).abs() < EPSILON);
    }

    #[test]
    fn test_cold_start_is_floored() {
        let base = BlendWeights::normalized(0.3, 0.7).unwrap();
        let weights = adjust_weights(base, activity(0, 0));
        assert!((weights.collaborative() - MIN_COLLABORATIVE_WEIGHT).abs() < EPSILON);
    }

    #[test]
    fn test_established_user_keeps_base_weights() {
        let weights = adjust_weights(BlendWeights::default(), activity(8, 4));
        assert!((weights.collaborative() - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_power_user_with_rich_history_is_capped() {
        let weights = adjust_weights(BlendWeights::default(), activity(25, 30));
        // 0.5 + 0.15 + 0.15 = 0.8, inside the cap
        assert!((weights.collaborative() - 0.8).abs() < EPSILON);

        let heavy = BlendWeights::normalized(0.8, 0.2).unwrap();
        let weights = adjust_weights(heavy, activity(25, 30));
        assert!((weights.collaborative() - MAX_COLLABORATIVE_WEIGHT).abs() < EPSILON);
    }

    #[test]
    fn test_adjusted_weights_stay_in_bounds() {
        for base in [0.0, 0.1, 0.3, 0.5, 0.7, 0.9, 1.0] {
            let base = BlendWeights::normalized(base, 1.0 - base).unwrap();
            for ratings in [0, 4, 5, 20, 21, 50] {
                for interactions in [0, 10, 11, 40] {
                    let w = adjust_weights(base, activity(ratings, interactions));
                    assert!((w.collaborative() + w.content() - 1.0).abs() < EPSILON);
                    assert!(w.collaborative() >= MIN_COLLABORATIVE_WEIGHT);
                    assert!(w.collaborative() <= MAX_COLLABORATIVE_WEIGHT);
                }
            }
        }
    }

    #[test]
    fn test_blend_combines_both_sources() {
        let weights = BlendWeights::normalized(0.25, 0.75).unwrap();
        let blended = blend(
            &predictions(&[(1, 8.0)]),
            &predictions(&[(1, 6.0)]),
            weights,
            SingleSourcePolicy::WeightShare,
        );
        assert!((blended[&MovieId(1)] - 6.5).abs() < EPSILON);
    }

    #[test]
    fn test_single_source_scores_use_weight_share_by_default() {
        // Known asymmetry: a lone prediction only gets its engine's share
        let weights = BlendWeights::normalized(0.25, 0.75).unwrap();
        let blended = blend(
            &predictions(&[(1, 8.0), (2, 8.0)]),
            &predictions(&[(1, 8.0)]),
            weights,
            SingleSourcePolicy::WeightShare,
        );

        assert!((blended[&MovieId(1)] - 8.0).abs() < EPSILON);
        assert!((blended[&MovieId(2)] - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_single_source_renormalized() {
        let weights = BlendWeights::normalized(0.25, 0.75).unwrap();
        let blended = blend(
            &predictions(&[(1, 8.0), (2, 8.0)]),
            &predictions(&[(1, 8.0), (3, 6.0)]),
            weights,
            SingleSourcePolicy::Renormalize,
        );

        assert!((blended[&MovieId(1)] - 8.0).abs() < EPSILON);
        assert!((blended[&MovieId(2)] - 8.0).abs() < EPSILON);
        assert!((blended[&MovieId(3)] - 6.0).abs() < EPSILON);
    }

    #[test]
    fn test_blender_uses_activity_of_target_user() {
        let mut builder = Snapshot::builder().user(1).movie(1, &[1]);
        for movie in 2..=13 {
            builder = builder
                .movie(movie, &[1])
                .interaction(1, movie, InteractionType::Watch);
        }
        let snapshot = builder.build();
        let blender = HybridBlender::new(&snapshot, HybridSettings::default());

        // Cold start (-0.25) and rich history (+0.15)
        let weights = blender.weights_for(UserId(1));
        assert!((weights.collaborative() - 0.4).abs() < EPSILON);
    }

    #[test]
    fn test_new_user_gets_no_predictions() {
        let snapshot = Snapshot::builder()
            .user(1)
            .user(2)
            .movie(10, &[1])
            .rating(2, 10, 8.0)
            .build();
        let blender = HybridBlender::new(&snapshot, HybridSettings::default());

        assert!(blender.predict_ratings(UserId(1), &[MovieId(10)]).is_empty());
    }
}
