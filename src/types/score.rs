//! Score, risk band and explanation result types.

use serde::{Deserialize, Serialize};

/// Lower bound of the credit score range.
pub const SCORE_MIN: f64 = 300.0;
/// Upper bound of the credit score range.
pub const SCORE_MAX: f64 = 900.0;

/// Map probability-of-good onto the bounded score range.
///
/// Fixed monotonic transform: higher probability of default yields a lower
/// score. The probability is clamped defensively but validated inputs never
/// leave [0, 1].
pub fn probability_to_score(probability_good: f64) -> f64 {
    let p = probability_good.clamp(0.0, 1.0);
    SCORE_MIN + p * (SCORE_MAX - SCORE_MIN)
}

/// Risk band classification derived from the credit score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl RiskBand {
    /// Score cutoff at or above which an applicant counts as approved.
    ///
    /// This is the Low band boundary; the fairness auditor uses the same
    /// cutoff for approval rates.
    pub const APPROVAL_CUTOFF: f64 = 750.0;

    /// Band cutoffs are fixed policy, ordered and covering the whole range.
    pub fn from_score(score: f64) -> Self {
        if score >= 800.0 {
            RiskBand::VeryLow
        } else if score >= Self::APPROVAL_CUTOFF {
            RiskBand::Low
        } else if score >= 700.0 {
            RiskBand::Medium
        } else if score >= 650.0 {
            RiskBand::High
        } else {
            RiskBand::VeryHigh
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskBand::VeryLow => "Very Low",
            RiskBand::Low => "Low",
            RiskBand::Medium => "Medium",
            RiskBand::High => "High",
            RiskBand::VeryHigh => "Very High",
        }
    }

    /// All bands in ascending-risk order, for histogram/distribution tables.
    pub fn all() -> [RiskBand; 5] {
        [
            RiskBand::VeryLow,
            RiskBand::Low,
            RiskBand::Medium,
            RiskBand::High,
            RiskBand::VeryHigh,
        ]
    }
}

/// Direction of a feature's push on the default probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impact {
    #[serde(rename = "increases risk")]
    IncreasesRisk,
    #[serde(rename = "reduces risk")]
    ReducesRisk,
}

impl Impact {
    /// Positive attribution pushes toward default; negative or zero reduces
    /// risk.
    pub fn from_attribution(shap_value: f64) -> Self {
        if shap_value > 0.0 {
            Impact::IncreasesRisk
        } else {
            Impact::ReducesRisk
        }
    }
}

/// A single per-instance feature attribution shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapExplanation {
    pub feature_key: String,
    pub feature_label: String,
    /// The submitted feature value, rendered for display.
    pub value: String,
    /// Signed attribution in log-odds-of-default space.
    pub shap_value: f64,
    pub impact: Impact,
}

/// Result of a single scoring request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub credit_score: f64,
    pub risk_band: RiskBand,
    pub probability_good: f64,
    pub probability_default: f64,
    pub top_explanations: Vec<ShapExplanation>,
    pub model_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_to_score_bounds() {
        assert_eq!(probability_to_score(0.0), 300.0);
        assert_eq!(probability_to_score(1.0), 900.0);
        assert_eq!(probability_to_score(0.5), 600.0);
        // Clamped, never outside the range.
        assert_eq!(probability_to_score(1.5), 900.0);
        assert_eq!(probability_to_score(-0.2), 300.0);
    }

    #[test]
    fn test_risk_band_from_score() {
        assert_eq!(RiskBand::from_score(850.0), RiskBand::VeryLow);
        assert_eq!(RiskBand::from_score(800.0), RiskBand::VeryLow);
        assert_eq!(RiskBand::from_score(760.0), RiskBand::Low);
        assert_eq!(RiskBand::from_score(720.0), RiskBand::Medium);
        assert_eq!(RiskBand::from_score(660.0), RiskBand::High);
        assert_eq!(RiskBand::from_score(400.0), RiskBand::VeryHigh);
    }

    #[test]
    fn test_impact_direction() {
        assert_eq!(Impact::from_attribution(0.3), Impact::IncreasesRisk);
        assert_eq!(Impact::from_attribution(-0.3), Impact::ReducesRisk);
        assert_eq!(Impact::from_attribution(0.0), Impact::ReducesRisk);
    }

    #[test]
    fn test_score_result_serialization() {
        let result = ScoreResult {
            credit_score: 812.5,
            risk_band: RiskBand::VeryLow,
            probability_good: 0.854,
            probability_default: 0.146,
            top_explanations: vec![ShapExplanation {
                feature_key: "utility_on_time_ratio".into(),
                feature_label: "On-time utility payments".into(),
                value: "0.9".into(),
                shap_value: -0.42,
                impact: Impact::ReducesRisk,
            }],
            model_version: "v1".into(),
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"risk_band\":\"Very Low\""));
        assert!(json.contains("\"impact\":\"reduces risk\""));

        let back: ScoreResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.risk_band, RiskBand::VeryLow);
        assert_eq!(back.top_explanations.len(), 1);
    }
}
