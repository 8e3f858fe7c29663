//! Immutable model generations and the atomically swapped publication point.

use crate::model::gbdt::GbdtModel;
use crate::types::dashboard::{Distributions, FairnessReport, GlobalShap, PortfolioKpis};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::info;

/// Everything derived from one training run, frozen as a unit.
///
/// A generation is built completely before it becomes visible; readers only
/// ever observe a fully-old or fully-new snapshot, never a mix.
#[derive(Debug)]
pub struct ModelGeneration {
    /// Monotonic version identifier, e.g. `v1`, `v2`.
    pub version: String,
    pub trained_at: DateTime<Utc>,
    pub model: GbdtModel,
    /// Validation AUC of this generation's model.
    pub auc: f64,
    pub kpis: PortfolioKpis,
    pub distributions: Distributions,
    pub global_shap: GlobalShap,
    pub fairness: FairnessReport,
}

/// Process-wide holder of the active generation.
///
/// The only cross-request shared state is this single reference; publication
/// is one pointer swap under the lock, reads clone the `Arc` and drop the
/// guard immediately.
#[derive(Debug, Default)]
pub struct GenerationStore {
    current: RwLock<Option<Arc<ModelGeneration>>>,
    version_counter: AtomicU64,
}

impl GenerationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next monotonic version identifier for a training run.
    pub fn next_version(&self) -> String {
        let n = self.version_counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("v{}", n)
    }

    /// Atomically replace the active generation.
    pub fn publish(&self, generation: ModelGeneration) -> Arc<ModelGeneration> {
        let generation = Arc::new(generation);
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = guard.replace(generation.clone());
        drop(guard);

        info!(
            version = %generation.version,
            auc = generation.auc,
            replaced = previous.as_ref().map(|p| p.version.as_str()),
            "Model generation published"
        );
        generation
    }

    /// The currently published generation, if any.
    pub fn current(&self) -> Option<Arc<ModelGeneration>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::gbdt::{GbdtModel, GbdtParams};
    use crate::types::dashboard::{Distributions, FairnessReport, GlobalShap, PortfolioKpis};

    fn dummy_generation(version: String) -> ModelGeneration {
        let xs = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let ys = vec![0.0, 0.0, 1.0, 1.0];
        let params = GbdtParams {
            n_trees: 2,
            max_depth: 1,
            learning_rate: 0.1,
            min_samples_leaf: 1,
            subsample: 1.0,
            seed: 1,
        };
        ModelGeneration {
            version,
            trained_at: Utc::now(),
            model: GbdtModel::train(&xs, &ys, &params).unwrap(),
            auc: 0.9,
            kpis: PortfolioKpis {
                auc: 0.9,
                avg_score: 700.0,
                default_rate: 0.1,
                risk_band_distribution: vec![],
            },
            distributions: Distributions {
                score_histogram: vec![],
                risk_band_histogram: vec![],
            },
            global_shap: GlobalShap { items: vec![] },
            fairness: FairnessReport {
                income_quartiles: vec![],
                digital_adoption_groups: vec![],
            },
        }
    }

    #[test]
    fn test_starts_empty() {
        let store = GenerationStore::new();
        assert!(store.current().is_none());
    }

    #[test]
    fn test_versions_are_monotonic() {
        let store = GenerationStore::new();
        assert_eq!(store.next_version(), "v1");
        assert_eq!(store.next_version(), "v2");
        assert_eq!(store.next_version(), "v3");
    }

    #[test]
    fn test_publish_swaps_whole_snapshot() {
        let store = GenerationStore::new();

        store.publish(dummy_generation(store.next_version()));
        let first = store.current().unwrap();
        assert_eq!(first.version, "v1");

        store.publish(dummy_generation(store.next_version()));
        let second = store.current().unwrap();
        assert_eq!(second.version, "v2");

        // The old snapshot stays intact for readers that still hold it.
        assert_eq!(first.version, "v1");
    }
}
