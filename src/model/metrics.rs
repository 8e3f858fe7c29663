//! Discrimination metrics for the validation subset.

/// Area under the ROC curve via the rank-sum (Mann-Whitney) formulation,
/// with average ranks for tied scores.
///
/// `labels` holds 0.0 / 1.0 outcomes; `scores` are the model's
/// probability-of-default (any monotone score ranks identically). Returns 0.5
/// when only one class is present, since ranking is then undefined.
pub fn roc_auc(labels: &[f64], scores: &[f64]) -> f64 {
    debug_assert_eq!(labels.len(), scores.len());

    let n_pos = labels.iter().filter(|&&y| y == 1.0).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Average ranks across tie groups.
    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let rank_sum_pos: f64 = labels
        .iter()
        .zip(ranks.iter())
        .filter(|(&y, _)| y == 1.0)
        .map(|(_, &r)| r)
        .sum();

    let n_pos_f = n_pos as f64;
    let n_neg_f = n_neg as f64;
    (rank_sum_pos - n_pos_f * (n_pos_f + 1.0) / 2.0) / (n_pos_f * n_neg_f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_ranking() {
        let labels = vec![0.0, 0.0, 0.0, 1.0, 1.0];
        let scores = vec![0.1, 0.2, 0.3, 0.8, 0.9];
        assert!((roc_auc(&labels, &scores) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_ranking() {
        let labels = vec![1.0, 1.0, 0.0, 0.0];
        let scores = vec![0.1, 0.2, 0.8, 0.9];
        assert!(roc_auc(&labels, &scores).abs() < 1e-12);
    }

    #[test]
    fn test_ties_get_average_rank() {
        // All scores identical: AUC must be exactly 0.5.
        let labels = vec![0.0, 1.0, 0.0, 1.0];
        let scores = vec![0.5, 0.5, 0.5, 0.5];
        assert!((roc_auc(&labels, &scores) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_single_class_defaults_to_half() {
        let labels = vec![0.0, 0.0];
        let scores = vec![0.2, 0.9];
        assert_eq!(roc_auc(&labels, &scores), 0.5);
    }

    #[test]
    fn test_partial_separation() {
        let labels = vec![0.0, 1.0, 0.0, 1.0];
        let scores = vec![0.1, 0.4, 0.35, 0.8];
        let auc = roc_auc(&labels, &scores);
        assert!(auc > 0.5 && auc <= 1.0);
    }
}
