//! Dashboard and metadata response shapes.
//!
//! These are the precomputed aggregates the transport layer serves verbatim.

use serde::{Deserialize, Serialize};

/// Count and share of one risk band across the validation population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskBandDistributionItem {
    pub band: String,
    pub count: usize,
    pub pct: f64,
}

/// Portfolio-level KPIs for the current model generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioKpis {
    pub auc: f64,
    pub avg_score: f64,
    pub default_rate: f64,
    pub risk_band_distribution: Vec<RiskBandDistributionItem>,
}

/// One bucket of a score or band histogram.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub bucket_label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distributions {
    pub score_histogram: Vec<HistogramBucket>,
    pub risk_band_histogram: Vec<HistogramBucket>,
}

/// Global importance of one feature over the validation population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalShapItem {
    pub feature_key: String,
    pub feature_label: String,
    pub mean_abs_shap: f64,
    /// Share of total attribution mass; sums to 1 across all features.
    pub relative_importance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalShap {
    pub items: Vec<GlobalShapItem>,
}

/// Approval statistics for one demographic-proxy group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairnessGroupMetrics {
    pub group: String,
    pub n: usize,
    pub avg_score: f64,
    pub approval_rate: f64,
    /// `None` exactly when the reference group's approval rate is zero.
    pub disparate_impact_ratio: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairnessReport {
    pub income_quartiles: Vec<FairnessGroupMetrics>,
    pub digital_adoption_groups: Vec<FairnessGroupMetrics>,
}

/// Feature metadata served to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureMetadataItem {
    pub key: String,
    pub label: String,
    pub description: String,
    pub category: String,
}

/// Static governance posture accompanying the feature metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceNotes {
    pub data_minimization: String,
    pub consent_first: String,
    pub explainability: String,
    pub no_sensitive_attributes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureMetadata {
    pub features: Vec<FeatureMetadataItem>,
    pub notes: GovernanceNotes,
}
