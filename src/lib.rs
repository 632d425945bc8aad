//! Movie recommendation engine
//!
//! Predicts how much a user would like unseen movies by blending user-user
//! collaborative filtering with genre-profile content matching, and ranks the
//! results. Catalog data is read through [`db::CatalogSource`]; every call works
//! on a fresh [`db::Snapshot`] and keeps no state between calls.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
