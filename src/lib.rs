//! Credit Scoring Engine Library
//!
//! A consent-gated, explainable alternative credit scoring engine working on
//! synthetic behavioral data: dataset generation, gradient-boosted model
//! training with minority-class oversampling, per-instance and global
//! attribution, and fairness auditing across demographic-proxy groups.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod explain;
pub mod fairness;
pub mod generation;
pub mod model;
pub mod registry;
pub mod scoring;
pub mod synthetic;
pub mod types;

pub use config::AppConfig;
pub use dashboard::DashboardAggregator;
pub use error::EngineError;
pub use generation::{GenerationStore, ModelGeneration};
pub use model::TrainingPipeline;
pub use scoring::ScoringService;
pub use synthetic::{BehavioralRecord, SyntheticDataGenerator};
pub use types::{ScoreRequest, ScoreResult};
