//! Prediction labels and risk tiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Probability above which a sample is labelled heavy rain.
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Binary outcome of the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionLabel {
    #[serde(rename = "Heavy Rain")]
    HeavyRain,
    #[serde(rename = "No Heavy Rain")]
    NoHeavyRain,
}

impl PredictionLabel {
    /// Label for a probability. The boundary is exclusive: 0.5 is no heavy rain.
    pub fn from_probability(probability: f32) -> Self {
        if probability > DECISION_THRESHOLD {
            PredictionLabel::HeavyRain
        } else {
            PredictionLabel::NoHeavyRain
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionLabel::HeavyRain => "Heavy Rain",
            PredictionLabel::NoHeavyRain => "No Heavy Rain",
        }
    }

    pub fn is_heavy_rain(&self) -> bool {
        matches!(self, PredictionLabel::HeavyRain)
    }
}

impl fmt::Display for PredictionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discretized confidence bucket of the heavy-rain probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower bounds (inclusive) of the Moderate and High tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    #[serde(default = "default_moderate")]
    pub moderate: f32,
    #[serde(default = "default_high")]
    pub high: f32,
}

fn default_moderate() -> f32 {
    0.4
}

fn default_high() -> f32 {
    0.7
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            moderate: default_moderate(),
            high: default_high(),
        }
    }
}

impl RiskThresholds {
    pub fn tier(&self, probability: f32) -> RiskTier {
        if probability >= self.high {
            RiskTier::High
        } else if probability >= self.moderate {
            RiskTier::Moderate
        } else {
            RiskTier::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_boundary_is_exclusive() {
        assert_eq!(PredictionLabel::from_probability(0.5), PredictionLabel::NoHeavyRain);
        assert_eq!(PredictionLabel::from_probability(0.5001), PredictionLabel::HeavyRain);
        assert_eq!(PredictionLabel::from_probability(0.0), PredictionLabel::NoHeavyRain);
        assert_eq!(PredictionLabel::from_probability(1.0), PredictionLabel::HeavyRain);
    }

    #[test]
    fn test_label_serializes_as_text() {
        let json = serde_json::to_string(&PredictionLabel::HeavyRain).unwrap();
        assert_eq!(json, "\"Heavy Rain\"");
        assert_eq!(PredictionLabel::NoHeavyRain.to_string(), "No Heavy Rain");
    }

    #[test]
    fn test_default_risk_tiers() {
        let thresholds = RiskThresholds::default();
        assert_eq!(thresholds.tier(0.0), RiskTier::Low);
        assert_eq!(thresholds.tier(0.399), RiskTier::Low);
        assert_eq!(thresholds.tier(0.4), RiskTier::Moderate);
        assert_eq!(thresholds.tier(0.699), RiskTier::Moderate);
        assert_eq!(thresholds.tier(0.7), RiskTier::High);
        assert_eq!(thresholds.tier(1.0), RiskTier::High);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = RiskThresholds { moderate: 0.2, high: 0.9 };
        assert_eq!(thresholds.tier(0.25), RiskTier::Moderate);
        assert_eq!(thresholds.tier(0.85), RiskTier::Moderate);
        assert_eq!(thresholds.tier(0.95), RiskTier::High);
    }
}
