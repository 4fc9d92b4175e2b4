//! Report wording and risk thresholds.
//!
//! Every field has a default, so a YAML override only needs the keys it
//! changes:
//!
//! ```yaml
//! thresholds:
//!   high: 0.8
//! confident_negative: 0.2
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use nowcast_common::{PredictionLabel, RiskThresholds, RiskTier};

use crate::error::ReportResult;

/// The four explanation paragraphs, chosen by label and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplanationTemplates {
    pub heavy_confident: String,
    pub heavy_moderate: String,
    pub clear_confident: String,
    pub clear_moderate: String,
}

impl Default for ExplanationTemplates {
    fn default() -> Self {
        Self {
            heavy_confident: "The model predicts a heavy rainfall episode with high confidence. \
                The Grad-CAM map should be read as the primary cloud regions that contributed \
                to this positive decision."
                .into(),
            heavy_moderate: "The model predicts heavy rainfall but confidence is moderate. \
                Treat this as a watch condition and confirm with additional observations."
                .into(),
            clear_confident: "The model predicts no heavy rainfall with high confidence. \
                Highlighted regions in Grad-CAM are still influential for the negative class."
                .into(),
            clear_moderate: "The model predicts no heavy rainfall with moderate confidence. \
                This is close to the decision boundary and can change as new frames arrive."
                .into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportPolicy {
    pub title: String,
    pub thresholds: RiskThresholds,
    /// Heavy-rain predictions at or above this are "high confidence".
    pub confident_positive: f32,
    /// No-heavy-rain predictions at or below this are "high confidence".
    pub confident_negative: f32,
    pub explanations: ExplanationTemplates,
    pub interpretation: String,
    pub failure_cases: String,
    pub usage_note: String,
    pub model_description: String,
    /// Column at which paragraphs are wrapped.
    pub wrap_width: usize,
}

impl Default for ReportPolicy {
    fn default() -> Self {
        Self {
            title: "Heavy Rainfall Nowcasting Report".into(),
            thresholds: RiskThresholds::default(),
            confident_positive: 0.7,
            confident_negative: 0.3,
            explanations: ExplanationTemplates::default(),
            interpretation: "Grad-CAM is an attention map indicating where the model focused most. \
                Warmer regions represent stronger contribution to the model output. \
                This is not a physical precipitation map, but an explanation of model behavior."
                .into(),
            failure_cases: "Known failure modes include thin cloud layers, rapidly evolving convection \
                between frames, or cloud structures that resemble heavy-rain signatures \
                without producing strong surface rainfall."
                .into(),
            usage_note: "Note: Use this output with meteorological context and operational checks.".into(),
            model_description: "CNNPatchMulti (9-channel input from 3 temporal frames)".into(),
            wrap_width: 90,
        }
    }
}

impl ReportPolicy {
    pub fn from_yaml_str(yaml: &str) -> ReportResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ReportResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn risk_tier(&self, probability: f32) -> RiskTier {
        self.thresholds.tier(probability)
    }

    pub fn explanation(&self, probability: f32, label: PredictionLabel) -> &str {
        let t = &self.explanations;
        match label {
            PredictionLabel::HeavyRain if probability >= self.confident_positive => &t.heavy_confident,
            PredictionLabel::HeavyRain => &t.heavy_moderate,
            PredictionLabel::NoHeavyRain if probability <= self.confident_negative => &t.clear_confident,
            PredictionLabel::NoHeavyRain => &t.clear_moderate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers() {
        let policy = ReportPolicy::default();
        assert_eq!(policy.risk_tier(0.7), RiskTier::High);
        assert_eq!(policy.risk_tier(0.69), RiskTier::Moderate);
        assert_eq!(policy.risk_tier(0.4), RiskTier::Moderate);
        assert_eq!(policy.risk_tier(0.39), RiskTier::Low);
    }

    #[test]
    fn test_explanation_selection() {
        let policy = ReportPolicy::default();
        assert!(policy
            .explanation(0.9, PredictionLabel::HeavyRain)
            .contains("high confidence"));
        assert!(policy
            .explanation(0.6, PredictionLabel::HeavyRain)
            .contains("watch condition"));
        assert!(policy
            .explanation(0.3, PredictionLabel::NoHeavyRain)
            .contains("no heavy rainfall with high confidence"));
        assert!(policy
            .explanation(0.45, PredictionLabel::NoHeavyRain)
            .contains("close to the decision boundary"));
    }

    #[test]
    fn test_partial_yaml_override() {
        let policy = ReportPolicy::from_yaml_str("thresholds:\n  high: 0.8\nconfident_negative: 0.2\n").unwrap();
        assert_eq!(policy.thresholds.high, 0.8);
        assert_eq!(policy.thresholds.moderate, 0.4);
        assert_eq!(policy.confident_negative, 0.2);
        assert_eq!(policy.title, "Heavy Rainfall Nowcasting Report");
        assert_eq!(policy.risk_tier(0.75), RiskTier::Moderate);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(ReportPolicy::from_yaml_str("wrap_width: [1, 2]").is_err());
    }
}
