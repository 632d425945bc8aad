use serde::Deserialize;

use crate::{
    error::AppResult,
    services::{
        BlendWeights, CollaborativeSettings, ContentSettings, DiscoverySettings, HybridSettings,
        SimilarityMethod, SingleSourcePolicy,
    },
};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Size of the collaborative neighborhood
    #[serde(default = "default_neighbor_count")]
    pub neighbor_count: usize,

    /// Combined similarity a user must exceed to become a neighbor
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    #[serde(default = "default_collaborative_similarity")]
    pub collaborative_similarity: SimilarityMethod,

    #[serde(default = "default_content_similarity")]
    pub content_similarity: SimilarityMethod,

    /// Hybrid base weight for collaborative predictions (renormalized)
    #[serde(default = "default_weight")]
    pub collaborative_weight: f64,

    /// Hybrid base weight for content predictions (renormalized)
    #[serde(default = "default_weight")]
    pub content_weight: f64,

    /// Scoring of movies only one engine could predict
    #[serde(default)]
    pub single_source_policy: SingleSourcePolicy,

    #[serde(default = "default_trending_window_days")]
    pub trending_window_days: u32,

    /// Rating at or above which a user counts as a fan of a movie
    #[serde(default = "default_liked_rating_threshold")]
    pub liked_rating_threshold: f64,

    /// Number of movies listed per section by the demo
    #[serde(default = "default_demo_limit")]
    pub demo_limit: usize,

    /// Tracing filter used when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_neighbor_count() -> usize {
    10
}

fn default_similarity_threshold() -> f64 {
    0.1
}

fn default_collaborative_similarity() -> SimilarityMethod {
    SimilarityMethod::Pearson
}

fn default_content_similarity() -> SimilarityMethod {
    SimilarityMethod::Cosine
}

fn default_weight() -> f64 {
    0.5
}

fn default_trending_window_days() -> u32 {
    30
}

fn default_liked_rating_threshold() -> f64 {
    7.0
}

fn default_demo_limit() -> usize {
    5
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from explicit key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn collaborative(&self) -> CollaborativeSettings {
        CollaborativeSettings {
            method: self.collaborative_similarity,
            neighbor_count: self.neighbor_count,
            similarity_threshold: self.similarity_threshold,
        }
    }

    pub fn content(&self) -> ContentSettings {
        ContentSettings {
            method: self.content_similarity,
        }
    }

    /// Settings for every prediction strategy; fails on unusable base weights
    pub fn hybrid(&self) -> AppResult<HybridSettings> {
        Ok(HybridSettings {
            base_weights: BlendWeights::normalized(
                self.collaborative_weight,
                self.content_weight,
            )?,
            single_source: self.single_source_policy,
            collaborative: self.collaborative(),
            content: self.content(),
        })
    }

    pub fn discovery(&self) -> DiscoverySettings {
        DiscoverySettings {
            liked_rating_threshold: self.liked_rating_threshold,
            trending_window_days: self.trending_window_days,
        }
    }
}
