//! Read-only dashboard accessors over the published generation.

use crate::error::EngineError;
use crate::generation::{GenerationStore, ModelGeneration};
use crate::registry;
use crate::types::dashboard::{
    Distributions, FairnessReport, FeatureMetadata, FeatureMetadataItem, GlobalShap,
    GovernanceNotes, PortfolioKpis,
};
use std::sync::Arc;

/// Serves the precomputed aggregates of the current generation.
///
/// Every read is a clone of frozen data; nothing here ever triggers
/// recomputation, so all reads within one generation are mutually
/// consistent.
pub struct DashboardAggregator {
    store: Arc<GenerationStore>,
}

impl DashboardAggregator {
    pub fn new(store: Arc<GenerationStore>) -> Self {
        Self { store }
    }

    fn current(&self) -> Result<Arc<ModelGeneration>, EngineError> {
        self.store.current().ok_or(EngineError::NotReady)
    }

    pub fn portfolio_kpis(&self) -> Result<PortfolioKpis, EngineError> {
        Ok(self.current()?.kpis.clone())
    }

    pub fn distributions(&self) -> Result<Distributions, EngineError> {
        Ok(self.current()?.distributions.clone())
    }

    pub fn global_attribution(&self) -> Result<GlobalShap, EngineError> {
        Ok(self.current()?.global_shap.clone())
    }

    pub fn fairness(&self) -> Result<FairnessReport, EngineError> {
        Ok(self.current()?.fairness.clone())
    }

    /// Version of the generation backing the other reads.
    pub fn model_version(&self) -> Result<String, EngineError> {
        Ok(self.current()?.version.clone())
    }

    /// Static schema and governance posture; available before any model is
    /// published.
    pub fn feature_metadata(&self) -> FeatureMetadata {
        let features = registry::features()
            .iter()
            .map(|d| FeatureMetadataItem {
                key: d.key.to_string(),
                label: d.label.to_string(),
                description: d.description.to_string(),
                category: d.category.to_string(),
            })
            .collect();

        FeatureMetadata {
            features,
            notes: GovernanceNotes {
                data_minimization: "Only behavioral, non-sensitive digital signals are used. \
                                    No protected attributes such as gender, race, or exact age \
                                    are collected."
                    .to_string(),
                consent_first: "The API refuses to score if consent is not explicitly provided \
                                with each request."
                    .to_string(),
                explainability: "Each score is accompanied by the main behavioral drivers using \
                                 SHAP-based explainability."
                    .to_string(),
                no_sensitive_attributes: "Protected or sensitive attributes are intentionally \
                                          excluded from the model and dataset."
                    .to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainingConfig;
    use crate::model::TrainingPipeline;
    use crate::registry::FEATURE_COUNT;

    fn empty_aggregator() -> DashboardAggregator {
        DashboardAggregator::new(Arc::new(GenerationStore::new()))
    }

    fn ready_aggregator() -> DashboardAggregator {
        let config = TrainingConfig {
            rows: 600,
            seed: 42,
            validation_ratio: 0.2,
            n_trees: 20,
            max_depth: 3,
            learning_rate: 0.2,
            min_samples_leaf: 5,
            subsample: 1.0,
        };
        let store = Arc::new(GenerationStore::new());
        let generation = TrainingPipeline::new(config)
            .run(store.next_version())
            .unwrap();
        store.publish(generation);
        DashboardAggregator::new(store)
    }

    #[test]
    fn test_not_ready_before_first_generation() {
        let aggregator = empty_aggregator();
        assert!(matches!(
            aggregator.portfolio_kpis().unwrap_err(),
            EngineError::NotReady
        ));
        assert!(matches!(
            aggregator.fairness().unwrap_err(),
            EngineError::NotReady
        ));
    }

    #[test]
    fn test_feature_metadata_is_static() {
        // Available even without a published generation.
        let metadata = empty_aggregator().feature_metadata();
        assert_eq!(metadata.features.len(), FEATURE_COUNT);
        assert_eq!(metadata.features[0].key, "ecom_txn_count");
        assert!(metadata.notes.consent_first.contains("consent"));
    }

    #[test]
    fn test_reads_reflect_published_generation() {
        let aggregator = ready_aggregator();

        let kpis = aggregator.portfolio_kpis().unwrap();
        assert!(kpis.auc > 0.5);
        assert_eq!(kpis.risk_band_distribution.len(), 5);

        let distributions = aggregator.distributions().unwrap();
        assert_eq!(distributions.score_histogram.len(), 12);
        assert_eq!(distributions.risk_band_histogram.len(), 5);

        let attribution = aggregator.global_attribution().unwrap();
        assert_eq!(attribution.items.len(), FEATURE_COUNT);

        let fairness = aggregator.fairness().unwrap();
        assert_eq!(fairness.income_quartiles.len(), 4);
        assert!(!fairness.digital_adoption_groups.is_empty());

        assert_eq!(aggregator.model_version().unwrap(), "v1");
    }
}
