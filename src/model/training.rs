//! Model training pipeline: split, rebalance, fit, evaluate, freeze.

use crate::config::TrainingConfig;
use crate::error::EngineError;
use crate::explain;
use crate::fairness::{self, ScoredRecord};
use crate::generation::ModelGeneration;
use crate::model::gbdt::{GbdtModel, GbdtParams};
use crate::model::metrics::roc_auc;
use crate::model::smote;
use crate::registry::FEATURE_COUNT;
use crate::synthetic::{BehavioralRecord, SyntheticDataGenerator};
use crate::types::dashboard::{
    Distributions, HistogramBucket, PortfolioKpis, RiskBandDistributionItem,
};
use crate::types::score::{probability_to_score, RiskBand, SCORE_MAX, SCORE_MIN};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

/// Width of one score histogram bucket.
const SCORE_BUCKET_WIDTH: f64 = 50.0;

/// Builds complete model generations from synthetic populations.
///
/// A run either yields a fully derived generation or an error; nothing
/// partial ever escapes. Publication is the caller's single atomic step.
pub struct TrainingPipeline {
    config: TrainingConfig,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Run the whole pipeline and return the frozen generation under the
    /// given version identifier.
    pub fn run(&self, version: String) -> Result<ModelGeneration, EngineError> {
        let cfg = &self.config;
        info!(
            version = %version,
            rows = cfg.rows,
            seed = cfg.seed,
            "Training pipeline started"
        );

        let records = SyntheticDataGenerator::generate(cfg.rows, cfg.seed)?;

        let (train_records, validation_records) =
            stratified_split(&records, cfg.validation_ratio, cfg.seed)?;
        info!(
            train = train_records.len(),
            validation = validation_records.len(),
            "Stratified split complete"
        );

        // Rebalancing touches the training subset only; the validation
        // subset keeps the natural imbalance for faithful evaluation.
        let train_xs: Vec<Vec<f64>> = train_records
            .iter()
            .map(|r| r.feature_vector().to_vec())
            .collect();
        let train_ys: Vec<f64> = train_records
            .iter()
            .map(|r| f64::from(u8::from(r.defaulted)))
            .collect();
        let (balanced_xs, balanced_ys) = smote::oversample(&train_xs, &train_ys, cfg.seed)?;
        info!(
            original = train_xs.len(),
            balanced = balanced_xs.len(),
            "Minority class oversampled"
        );

        let params = GbdtParams {
            n_trees: cfg.n_trees,
            max_depth: cfg.max_depth,
            learning_rate: cfg.learning_rate,
            min_samples_leaf: cfg.min_samples_leaf,
            subsample: cfg.subsample,
            seed: cfg.seed,
        };
        let model = GbdtModel::train(&balanced_xs, &balanced_ys, &params)?;

        // Everything below is derived from the untouched validation subset
        // at this generation's scoring function.
        let validation_vectors: Vec<[f64; FEATURE_COUNT]> = validation_records
            .iter()
            .map(|r| r.feature_vector())
            .collect();
        let default_probabilities: Vec<f64> = validation_vectors
            .iter()
            .map(|x| model.predict_default_probability(x))
            .collect();
        let validation_labels: Vec<f64> = validation_records
            .iter()
            .map(|r| f64::from(u8::from(r.defaulted)))
            .collect();

        let auc = roc_auc(&validation_labels, &default_probabilities);

        let scores: Vec<f64> = default_probabilities
            .iter()
            .map(|&p_default| probability_to_score(1.0 - p_default))
            .collect();

        let kpis = build_kpis(auc, &scores, &validation_records);
        let distributions = build_distributions(&scores);
        let global_shap = explain::global_importance(&model, &validation_vectors);

        let scored: Vec<ScoredRecord> = validation_records
            .iter()
            .zip(scores.iter())
            .map(|(record, &score)| ScoredRecord {
                income_monthly: record.income_monthly,
                digital_adoption_score: record.digital_adoption_score,
                score,
            })
            .collect();
        let fairness = fairness::audit(&scored);

        info!(
            version = %version,
            auc = auc,
            avg_score = kpis.avg_score,
            default_rate = kpis.default_rate,
            "Training pipeline finished"
        );

        Ok(ModelGeneration {
            version,
            trained_at: Utc::now(),
            model,
            auc,
            kpis,
            distributions,
            global_shap,
            fairness,
        })
    }
}

/// Seeded stratified split: shuffle each class separately, carve off the
/// validation fraction of each, keep the rest for training.
fn stratified_split(
    records: &[BehavioralRecord],
    validation_ratio: f64,
    seed: u64,
) -> Result<(Vec<BehavioralRecord>, Vec<BehavioralRecord>), EngineError> {
    if !(0.0..1.0).contains(&validation_ratio) || validation_ratio == 0.0 {
        return Err(EngineError::Training(format!(
            "validation ratio must be in (0, 1), got {}",
            validation_ratio
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut validation = Vec::new();

    for class in [false, true] {
        let mut class_idx: Vec<usize> = (0..records.len())
            .filter(|&i| records[i].defaulted == class)
            .collect();
        class_idx.shuffle(&mut rng);

        let n_validation = ((class_idx.len() as f64) * validation_ratio).round() as usize;
        for (position, &idx) in class_idx.iter().enumerate() {
            if position < n_validation {
                validation.push(records[idx].clone());
            } else {
                train.push(records[idx].clone());
            }
        }
    }

    if train.is_empty() || validation.is_empty() {
        return Err(EngineError::Training(
            "population too small for a train/validation split".into(),
        ));
    }
    Ok((train, validation))
}

fn build_kpis(auc: f64, scores: &[f64], validation: &[BehavioralRecord]) -> PortfolioKpis {
    let n = scores.len() as f64;
    let avg_score = scores.iter().sum::<f64>() / n;
    let default_rate = validation.iter().filter(|r| r.defaulted).count() as f64 / n;

    let bands: Vec<RiskBand> = scores.iter().map(|&s| RiskBand::from_score(s)).collect();
    let risk_band_distribution = RiskBand::all()
        .iter()
        .map(|&band| {
            let count = bands.iter().filter(|&&b| b == band).count();
            RiskBandDistributionItem {
                band: band.as_str().to_string(),
                count,
                pct: count as f64 / n,
            }
        })
        .collect();

    PortfolioKpis {
        auc,
        avg_score,
        default_rate,
        risk_band_distribution,
    }
}

fn build_distributions(scores: &[f64]) -> Distributions {
    let mut score_histogram = Vec::new();
    let mut start = SCORE_MIN;
    while start < SCORE_MAX {
        let end = start + SCORE_BUCKET_WIDTH;
        // The top bucket is closed so a perfect score is still counted.
        let count = scores
            .iter()
            .filter(|&&s| s >= start && (s < end || (end >= SCORE_MAX && s <= end)))
            .count();
        score_histogram.push(HistogramBucket {
            bucket_label: format!("{}-{}", start as i64, end as i64),
            count,
        });
        start = end;
    }

    let bands: Vec<RiskBand> = scores.iter().map(|&s| RiskBand::from_score(s)).collect();
    let risk_band_histogram = RiskBand::all()
        .iter()
        .map(|&band| HistogramBucket {
            bucket_label: band.as_str().to_string(),
            count: bands.iter().filter(|&&b| b == band).count(),
        })
        .collect();

    Distributions {
        score_histogram,
        risk_band_histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainingConfig;

    /// Production-sized configuration: smaller fixtures do not reliably
    /// clear the 0.6 AUC bar at seed 42 (see REVIEW_FINDINGS.md F5).
    fn small_config() -> TrainingConfig {
        TrainingConfig {
            rows: 10000,
            seed: 42,
            validation_ratio: 0.2,
            n_trees: 150,
            max_depth: 4,
            learning_rate: 0.1,
            min_samples_leaf: 20,
            subsample: 0.9,
        }
    }

    #[test]
    fn test_stratified_split_preserves_imbalance() {
        let records = SyntheticDataGenerator::generate(1000, 42).unwrap();
        let population_rate =
            records.iter().filter(|r| r.defaulted).count() as f64 / records.len() as f64;

        let (train, validation) = stratified_split(&records, 0.2, 42).unwrap();
        assert_eq!(train.len() + validation.len(), records.len());

        let validation_rate =
            validation.iter().filter(|r| r.defaulted).count() as f64 / validation.len() as f64;
        assert!(
            (validation_rate - population_rate).abs() < 0.02,
            "validation rate {} drifted from population rate {}",
            validation_rate,
            population_rate
        );
    }

    #[test]
    fn test_invalid_split_ratio_rejected() {
        let records = SyntheticDataGenerator::generate(100, 1).unwrap();
        assert!(stratified_split(&records, 0.0, 1).is_err());
        assert!(stratified_split(&records, 1.0, 1).is_err());
    }

    #[test]
    fn test_pipeline_produces_discriminating_model() {
        let generation = TrainingPipeline::new(small_config())
            .run("v1".into())
            .unwrap();

        assert!(
            generation.auc > 0.6,
            "model failed to learn the engineered signal: auc {}",
            generation.auc
        );
        assert_eq!(generation.kpis.auc, generation.auc);
        assert!(generation.kpis.default_rate > 0.0 && generation.kpis.default_rate < 0.5);
        assert!(generation.kpis.avg_score >= SCORE_MIN && generation.kpis.avg_score <= SCORE_MAX);
    }

    #[test]
    fn test_retraining_is_deterministic() {
        let a = TrainingPipeline::new(small_config()).run("v1".into()).unwrap();
        let b = TrainingPipeline::new(small_config()).run("v2".into()).unwrap();

        assert_eq!(a.auc, b.auc);

        let order_a: Vec<&str> = a
            .global_shap
            .items
            .iter()
            .map(|i| i.feature_key.as_str())
            .collect();
        let order_b: Vec<&str> = b
            .global_shap
            .items
            .iter()
            .map(|i| i.feature_key.as_str())
            .collect();
        assert_eq!(order_a, order_b);
    }

    #[test]
    fn test_derived_artifacts_are_consistent() {
        let generation = TrainingPipeline::new(small_config())
            .run("v1".into())
            .unwrap();

        let pct_total: f64 = generation
            .kpis
            .risk_band_distribution
            .iter()
            .map(|item| item.pct)
            .sum();
        assert!((pct_total - 1.0).abs() < 1e-9);

        let validation_size: usize = generation
            .kpis
            .risk_band_distribution
            .iter()
            .map(|item| item.count)
            .sum();
        let histogram_total: usize = generation
            .distributions
            .score_histogram
            .iter()
            .map(|bucket| bucket.count)
            .sum();
        assert_eq!(validation_size, histogram_total);

        let importance_total: f64 = generation
            .global_shap
            .items
            .iter()
            .map(|item| item.relative_importance)
            .sum();
        assert!((importance_total - 1.0).abs() < 1e-9);

        let quartile_total: usize = generation
            .fairness
            .income_quartiles
            .iter()
            .map(|group| group.n)
            .sum();
        assert_eq!(quartile_total, validation_size);
        assert_eq!(generation.fairness.income_quartiles.len(), 4);
    }
}
