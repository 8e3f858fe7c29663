//! Per-instance and global feature attribution.
//!
//! Attributions come from the model's decision-path decomposition
//! ([`GbdtModel::feature_contributions`]): additive, signed, expressed in
//! log-odds-of-default space relative to the training-population baseline.
//! Positive values push toward the default outcome.

use crate::model::gbdt::GbdtModel;
use crate::registry::{self, FEATURE_COUNT};
use crate::types::dashboard::{GlobalShap, GlobalShapItem};
use crate::types::score::{Impact, ShapExplanation};

/// Number of explanations attached to each score result.
pub const TOP_K: usize = 5;

/// Top-k explanations for one instance, by descending absolute attribution.
///
/// Ties are broken by feature declaration order, so the output is fully
/// deterministic. `display_values` carries one rendered value per feature in
/// registry order.
pub fn explain_instance(
    model: &GbdtModel,
    features: &[f64; FEATURE_COUNT],
    display_values: &[String],
) -> Vec<ShapExplanation> {
    let (_bias, contributions) = model.feature_contributions(features);

    let mut order: Vec<usize> = (0..FEATURE_COUNT).collect();
    order.sort_by(|&a, &b| {
        contributions[b]
            .abs()
            .partial_cmp(&contributions[a].abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    order
        .into_iter()
        .take(TOP_K)
        .map(|idx| {
            let desc = &registry::features()[idx];
            ShapExplanation {
                feature_key: desc.key.to_string(),
                feature_label: desc.label.to_string(),
                value: display_values
                    .get(idx)
                    .cloned()
                    .unwrap_or_else(|| "n/a".to_string()),
                shap_value: contributions[idx],
                impact: Impact::from_attribution(contributions[idx]),
            }
        })
        .collect()
}

/// Global importance over a population: mean absolute attribution per
/// feature, normalized so relative importances sum to 1 across all registry
/// features. Items are sorted by descending importance (declaration order on
/// ties); every feature is included.
pub fn global_importance(model: &GbdtModel, population: &[[f64; FEATURE_COUNT]]) -> GlobalShap {
    let mut mean_abs = [0.0; FEATURE_COUNT];
    for features in population {
        let (_bias, contributions) = model.feature_contributions(features);
        for (acc, c) in mean_abs.iter_mut().zip(contributions.iter()) {
            *acc += c.abs();
        }
    }
    if !population.is_empty() {
        for acc in mean_abs.iter_mut() {
            *acc /= population.len() as f64;
        }
    }

    let total: f64 = mean_abs.iter().sum();
    let denominator = if total > 0.0 { total } else { 1.0 };

    let mut order: Vec<usize> = (0..FEATURE_COUNT).collect();
    order.sort_by(|&a, &b| {
        mean_abs[b]
            .partial_cmp(&mean_abs[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let items = order
        .into_iter()
        .map(|idx| {
            let desc = &registry::features()[idx];
            GlobalShapItem {
                feature_key: desc.key.to_string(),
                feature_label: desc.label.to_string(),
                mean_abs_shap: mean_abs[idx],
                relative_importance: mean_abs[idx] / denominator,
            }
        })
        .collect();

    GlobalShap { items }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::gbdt::GbdtParams;

    /// Train a tiny model where only the first two features carry signal.
    fn toy_model() -> GbdtModel {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for i in 0..60 {
            let mut row = vec![0.0; FEATURE_COUNT];
            row[0] = (i % 10) as f64;
            row[1] = (i % 3) as f64;
            // Constant filler so the remaining features are never split on.
            for value in row.iter_mut().skip(2) {
                *value = 1.0;
            }
            xs.push(row);
            ys.push(if i % 10 >= 6 { 1.0 } else { 0.0 });
        }
        let params = GbdtParams {
            n_trees: 15,
            max_depth: 2,
            learning_rate: 0.3,
            min_samples_leaf: 2,
            subsample: 1.0,
            seed: 5,
        };
        GbdtModel::train(&xs, &ys, &params).unwrap()
    }

    fn instance(first: f64) -> [f64; FEATURE_COUNT] {
        let mut features = [1.0; FEATURE_COUNT];
        features[0] = first;
        features[1] = 1.0;
        features
    }

    fn display_values() -> Vec<String> {
        (0..FEATURE_COUNT).map(|i| format!("{}", i)).collect()
    }

    #[test]
    fn test_returns_exactly_top_k() {
        let model = toy_model();
        let explanations = explain_instance(&model, &instance(8.0), &display_values());
        assert_eq!(explanations.len(), TOP_K);
    }

    #[test]
    fn test_sorted_by_descending_absolute_attribution() {
        let model = toy_model();
        let explanations = explain_instance(&model, &instance(8.0), &display_values());

        for pair in explanations.windows(2) {
            assert!(
                pair[0].shap_value.abs() >= pair[1].shap_value.abs(),
                "explanations not sorted: {} < {}",
                pair[0].shap_value.abs(),
                pair[1].shap_value.abs()
            );
        }
    }

    #[test]
    fn test_signal_feature_dominates() {
        let model = toy_model();
        let explanations = explain_instance(&model, &instance(9.0), &display_values());

        assert_eq!(explanations[0].feature_key, "ecom_txn_count");
        assert_eq!(explanations[0].impact, Impact::IncreasesRisk);

        let safe = explain_instance(&model, &instance(0.0), &display_values());
        assert_eq!(safe[0].feature_key, "ecom_txn_count");
        assert_eq!(safe[0].impact, Impact::ReducesRisk);
    }

    #[test]
    fn test_global_importance_sums_to_one() {
        let model = toy_model();
        let population: Vec<[f64; FEATURE_COUNT]> =
            (0..20).map(|i| instance((i % 10) as f64)).collect();

        let global = global_importance(&model, &population);
        assert_eq!(global.items.len(), FEATURE_COUNT);

        let total: f64 = global.items.iter().map(|i| i.relative_importance).sum();
        assert!((total - 1.0).abs() < 1e-9, "importances sum to {}", total);

        // The only splittable feature carries all importance.
        assert_eq!(global.items[0].feature_key, "ecom_txn_count");
        assert!(global.items[0].relative_importance > 0.9);
    }

    #[test]
    fn test_global_importance_sorted_descending() {
        let model = toy_model();
        let population: Vec<[f64; FEATURE_COUNT]> =
            (0..20).map(|i| instance((i % 10) as f64)).collect();
        let global = global_importance(&model, &population);

        for pair in global.items.windows(2) {
            assert!(pair[0].mean_abs_shap >= pair[1].mean_abs_shap);
        }
    }
}
