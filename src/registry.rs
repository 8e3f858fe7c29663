//! Canonical feature schema for the scoring engine.
//!
//! Every component that touches a feature vector relies on the declaration
//! order in [`features`]: the synthetic generator, the model, the attribution
//! code and request validation all index features positionally. The registry
//! is defined once and never changes at runtime.

use serde::{Deserialize, Serialize};

/// Number of features in the canonical schema.
pub const FEATURE_COUNT: usize = 18;

/// Validation domain for a single feature value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureDomain {
    /// Any finite value >= 0 (counts, amounts, volatilities).
    NonNegative,
    /// Finite value in [0, 1] (ratios, shares).
    UnitInterval,
    /// Any finite value (signed margins).
    Finite,
    /// One of the declared activity levels.
    ActivityLevel,
}

/// Immutable description of a single feature in the canonical order.
#[derive(Debug, Clone, Copy)]
pub struct FeatureDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub domain: FeatureDomain,
}

/// Social-media activity tier, the single categorical feature.
///
/// Encoded ordinally (low = 0, medium = 1, high = 2) so attributions stay
/// aligned with the 18-entry registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Low,
    Medium,
    High,
}

impl ActivityLevel {
    pub fn as_ordinal(self) -> f64 {
        match self {
            ActivityLevel::Low => 0.0,
            ActivityLevel::Medium => 1.0,
            ActivityLevel::High => 2.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Low => "low",
            ActivityLevel::Medium => "medium",
            ActivityLevel::High => "high",
        }
    }
}

static FEATURES: [FeatureDescriptor; FEATURE_COUNT] = [
    FeatureDescriptor {
        key: "ecom_txn_count",
        label: "E-commerce transaction count",
        description: "Number of monthly online transactions.",
        category: "E-commerce",
        domain: FeatureDomain::NonNegative,
    },
    FeatureDescriptor {
        key: "ecom_spend",
        label: "E-commerce monthly spend",
        description: "Total amount spent online per month.",
        category: "E-commerce",
        domain: FeatureDomain::NonNegative,
    },
    FeatureDescriptor {
        key: "ecom_refund_rate",
        label: "Refund rate",
        description: "Share of transactions that resulted in refunds or chargebacks.",
        category: "E-commerce",
        domain: FeatureDomain::UnitInterval,
    },
    FeatureDescriptor {
        key: "ecom_category_diversity",
        label: "Category diversity",
        description: "Number of distinct purchase categories.",
        category: "E-commerce",
        domain: FeatureDomain::NonNegative,
    },
    FeatureDescriptor {
        key: "utility_on_time_ratio",
        label: "On-time utility payments",
        description: "Proportion of utility bills paid on or before due date.",
        category: "Utility",
        domain: FeatureDomain::UnitInterval,
    },
    FeatureDescriptor {
        key: "utility_avg_days_late",
        label: "Average days late",
        description: "Average days late when bills are overdue.",
        category: "Utility",
        domain: FeatureDomain::NonNegative,
    },
    FeatureDescriptor {
        key: "utility_bill_volatility",
        label: "Utility bill volatility",
        description: "Variation in monthly utility spend.",
        category: "Utility",
        domain: FeatureDomain::NonNegative,
    },
    FeatureDescriptor {
        key: "wallet_txn_count",
        label: "Digital wallet transactions",
        description: "Number of monthly digital wallet transactions.",
        category: "Digital wallet",
        domain: FeatureDomain::NonNegative,
    },
    FeatureDescriptor {
        key: "wallet_txn_share",
        label: "Digital wallet share",
        description: "Share of total payments made via digital wallet.",
        category: "Digital wallet",
        domain: FeatureDomain::UnitInterval,
    },
    FeatureDescriptor {
        key: "wallet_balance_volatility",
        label: "Wallet balance volatility",
        description: "Variation in wallet balance over time.",
        category: "Digital wallet",
        domain: FeatureDomain::NonNegative,
    },
    FeatureDescriptor {
        key: "income_monthly",
        label: "Monthly income (synthetic)",
        description: "Estimated monthly income from digital cash flows.",
        category: "Cash flow",
        domain: FeatureDomain::NonNegative,
    },
    FeatureDescriptor {
        key: "inflow_volatility",
        label: "Inflow volatility",
        description: "Variability of incoming funds.",
        category: "Cash flow",
        domain: FeatureDomain::NonNegative,
    },
    FeatureDescriptor {
        key: "outflow_volatility",
        label: "Outflow volatility",
        description: "Variability of outgoing payments.",
        category: "Cash flow",
        domain: FeatureDomain::NonNegative,
    },
    FeatureDescriptor {
        key: "net_cash_margin",
        label: "Net cash margin",
        description: "Net cash surplus as share of inflows.",
        category: "Cash flow",
        domain: FeatureDomain::Finite,
    },
    FeatureDescriptor {
        key: "sm_post_freq",
        label: "Posting frequency",
        description: "Average number of social posts per week.",
        category: "Social media",
        domain: FeatureDomain::NonNegative,
    },
    FeatureDescriptor {
        key: "sm_engagement_score",
        label: "Engagement score",
        description: "Normalized likes/comments activity.",
        category: "Social media",
        domain: FeatureDomain::NonNegative,
    },
    FeatureDescriptor {
        key: "sm_account_age_years",
        label: "Account age",
        description: "Age of social account in years.",
        category: "Social media",
        domain: FeatureDomain::NonNegative,
    },
    FeatureDescriptor {
        key: "sm_activity_level",
        label: "Activity level",
        description: "Categorized activity (low/medium/high).",
        category: "Social media",
        domain: FeatureDomain::ActivityLevel,
    },
];

/// The canonical, ordered feature schema.
pub fn features() -> &'static [FeatureDescriptor; FEATURE_COUNT] {
    &FEATURES
}

/// Look up a descriptor by key.
pub fn descriptor(key: &str) -> Option<&'static FeatureDescriptor> {
    FEATURES.iter().find(|d| d.key == key)
}

/// Check a numeric value against a feature's declared domain.
///
/// Returns a machine-readable reason on rejection. Values are never clamped.
pub fn check_domain(desc: &FeatureDescriptor, value: f64) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{}: value must be a finite number", desc.key));
    }
    match desc.domain {
        FeatureDomain::NonNegative => {
            if value < 0.0 {
                return Err(format!("{}: value must be >= 0", desc.key));
            }
        }
        FeatureDomain::UnitInterval => {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{}: value must be within [0, 1]", desc.key));
            }
        }
        FeatureDomain::Finite | FeatureDomain::ActivityLevel => {}
    }
    Ok(())
}
