//! Configuration management for the scoring engine

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub training: TrainingConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// Training pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Size of the generated synthetic population
    pub rows: usize,
    /// Seed for every stochastic step (generation, split, oversampling,
    /// tree subsampling)
    pub seed: u64,
    /// Fraction of the population held out for validation
    pub validation_ratio: f64,
    /// Number of boosted trees
    pub n_trees: usize,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Boosting learning rate
    pub learning_rate: f64,
    /// Minimum samples per leaf
    pub min_samples_leaf: usize,
    /// Row subsampling fraction per tree
    pub subsample: f64,
}

/// Scoring worker pool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of concurrent scoring computations
    pub workers: usize,
    /// Per-request computation budget in milliseconds
    pub timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from the default file location
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Load from the default location, falling back to built-in defaults
    /// when no config file is present
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(error) => {
                warn!(error = %error, "Falling back to default configuration");
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            training: TrainingConfig {
                rows: 10_000,
                seed: 42,
                validation_ratio: 0.2,
                n_trees: 150,
                max_depth: 4,
                learning_rate: 0.1,
                min_samples_leaf: 20,
                subsample: 0.9,
            },
            pipeline: PipelineConfig {
                workers: 4,
                timeout_ms: 1000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
