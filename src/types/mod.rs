//! Type definitions for the credit scoring engine

pub mod dashboard;
pub mod request;
pub mod score;

pub use dashboard::{
    Distributions, FairnessGroupMetrics, FairnessReport, FeatureMetadata, GlobalShap,
    GlobalShapItem, PortfolioKpis,
};
pub use request::ScoreRequest;
pub use score::{Impact, RiskBand, ScoreResult, ShapExplanation};
