//! Scoring request shape consumed by the (external) transport layer.

use crate::registry::{ActivityLevel, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

/// A single scoring request: the 18 behavioral features plus explicit consent.
///
/// Field order mirrors the registry's canonical feature order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    // E-commerce
    pub ecom_txn_count: f64,
    pub ecom_spend: f64,
    pub ecom_refund_rate: f64,
    pub ecom_category_diversity: f64,

    // Utility
    pub utility_on_time_ratio: f64,
    pub utility_avg_days_late: f64,
    pub utility_bill_volatility: f64,

    // Digital wallet
    pub wallet_txn_count: f64,
    pub wallet_txn_share: f64,
    pub wallet_balance_volatility: f64,

    // Cash flow
    pub income_monthly: f64,
    pub inflow_volatility: f64,
    pub outflow_volatility: f64,
    pub net_cash_margin: f64,

    // Social media
    pub sm_post_freq: f64,
    pub sm_engagement_score: f64,
    pub sm_account_age_years: f64,
    pub sm_activity_level: ActivityLevel,

    /// Hard precondition: scoring refuses to run without explicit consent.
    pub consent: bool,
}

impl ScoreRequest {
    /// Numeric feature vector in canonical registry order.
    ///
    /// The categorical activity level is encoded ordinally so the vector
    /// aligns positionally with the registry and with attributions.
    pub fn feature_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.ecom_txn_count,
            self.ecom_spend,
            self.ecom_refund_rate,
            self.ecom_category_diversity,
            self.utility_on_time_ratio,
            self.utility_avg_days_late,
            self.utility_bill_volatility,
            self.wallet_txn_count,
            self.wallet_txn_share,
            self.wallet_balance_volatility,
            self.income_monthly,
            self.inflow_volatility,
            self.outflow_volatility,
            self.net_cash_margin,
            self.sm_post_freq,
            self.sm_engagement_score,
            self.sm_account_age_years,
            self.sm_activity_level.as_ordinal(),
        ]
    }

    /// Human-readable value per feature, in canonical order, for explanations.
    pub fn display_values(&self) -> Vec<String> {
        let vector = self.feature_vector();
        vector
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                if idx == FEATURE_COUNT - 1 {
                    self.sm_activity_level.as_str().to_string()
                } else {
                    format!("{}", value)
                }
            })
            .collect()
    }

    /// The reference demo request: a mid-population applicant.
    pub fn baseline() -> Self {
        Self {
            ecom_txn_count: 10.0,
            ecom_spend: 20_000.0,
            ecom_refund_rate: 0.02,
            ecom_category_diversity: 4.0,
            utility_on_time_ratio: 0.9,
            utility_avg_days_late: 1.0,
            utility_bill_volatility: 8.0,
            wallet_txn_count: 12.0,
            wallet_txn_share: 0.5,
            wallet_balance_volatility: 3.0,
            income_monthly: 60_000.0,
            inflow_volatility: 2.5,
            outflow_volatility: 2.5,
            net_cash_margin: 0.15,
            sm_post_freq: 5.0,
            sm_engagement_score: 1.0,
            sm_account_age_years: 4.0,
            sm_activity_level: ActivityLevel::Medium,
            consent: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = ScoreRequest::baseline();

        let json = serde_json::to_string(&req).unwrap();
        let deserialized: ScoreRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(req.ecom_txn_count, deserialized.ecom_txn_count);
        assert_eq!(req.sm_activity_level, deserialized.sm_activity_level);
        assert!(deserialized.consent);
        assert!(json.contains("\"sm_activity_level\":\"medium\""));
    }

    #[test]
    fn test_feature_vector_order() {
        let req = ScoreRequest::baseline();
        let vector = req.feature_vector();

        assert_eq!(vector.len(), FEATURE_COUNT);
        assert_eq!(vector[0], 10.0); // ecom_txn_count
        assert_eq!(vector[10], 60_000.0); // income_monthly
        assert_eq!(vector[17], 1.0); // medium activity, ordinal
    }

    #[test]
    fn test_display_values() {
        let req = ScoreRequest::baseline();
        let values = req.display_values();

        assert_eq!(values.len(), FEATURE_COUNT);
        assert_eq!(values[2], "0.02");
        assert_eq!(values[17], "medium");
    }

    #[test]
    fn test_invalid_activity_level_rejected() {
        let mut raw: serde_json::Value =
            serde_json::to_value(ScoreRequest::baseline()).unwrap();
        raw["sm_activity_level"] = serde_json::Value::String("extreme".into());

        assert!(serde_json::from_value::<ScoreRequest>(raw).is_err());
    }
}
