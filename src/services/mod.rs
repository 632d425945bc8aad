use std::collections::HashMap;

use crate::models::{MovieId, UserId};

pub mod collaborative;
pub mod content;
pub mod discovery;
pub mod hybrid;
pub mod recommendations;
pub mod similarity;

pub use collaborative::{CollaborativeEngine, CollaborativeSettings, Neighbor};
pub use content::{ContentEngine, ContentSettings};
pub use discovery::{DiscoveryService, DiscoverySettings};
pub use hybrid::{BlendWeights, HybridBlender, HybridSettings, SingleSourcePolicy};
pub use recommendations::{RecommendationService, Strategy};
pub use similarity::{Cosine, Pearson, SimilarityCalculator, SimilarityMethod};

/// Common contract of every prediction strategy
///
/// Movies the strategy has no signal for are absent from the result.
pub trait RatingPredictor {
    fn predict_ratings(&self, user_id: UserId, movie_ids: &[MovieId]) -> HashMap<MovieId, f64>;
}
