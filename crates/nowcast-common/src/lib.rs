//! Common types and utilities shared across all rain-nowcast crates and services.

pub mod error;
pub mod geometry;
pub mod prediction;

pub use error::{NowcastError, NowcastResult};
pub use geometry::PatchGeometry;
pub use prediction::{PredictionLabel, RiskThresholds, RiskTier};
