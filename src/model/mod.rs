//! Model training and inference components

pub mod gbdt;
pub mod metrics;
pub mod smote;
pub mod training;

pub use gbdt::{GbdtModel, GbdtParams};
pub use training::TrainingPipeline;
