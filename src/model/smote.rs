//! Minority-class oversampling by synthetic interpolation (SMOTE-style).
//!
//! Applied to the training subset only; the validation subset must keep the
//! natural class imbalance.

use crate::error::EngineError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of nearest minority neighbors considered per synthetic sample.
const K_NEIGHBORS: usize = 5;

/// Oversample the minority class up to parity with the majority class.
///
/// Each synthetic sample interpolates between a random minority sample and
/// one of its k nearest minority neighbors (Euclidean distance). Returns the
/// rebalanced `(rows, labels)`; original rows come first, in input order.
pub fn oversample(
    xs: &[Vec<f64>],
    ys: &[f64],
    seed: u64,
) -> Result<(Vec<Vec<f64>>, Vec<f64>), EngineError> {
    if xs.len() != ys.len() {
        return Err(EngineError::Training(format!(
            "inconsistent oversampling input: {} rows, {} labels",
            xs.len(),
            ys.len()
        )));
    }

    let minority_label = minority_class(ys)
        .ok_or_else(|| EngineError::Training("training subset has a single class".into()))?;

    let minority_idx: Vec<usize> = (0..ys.len())
        .filter(|&i| ys[i] == minority_label)
        .collect();
    let majority_count = ys.len() - minority_idx.len();
    let needed = majority_count.saturating_sub(minority_idx.len());

    let mut out_xs = xs.to_vec();
    let mut out_ys = ys.to_vec();
    if needed == 0 {
        return Ok((out_xs, out_ys));
    }

    // Too few minority points to interpolate between; duplicate instead.
    if minority_idx.len() < 2 {
        let only = minority_idx[0];
        for _ in 0..needed {
            out_xs.push(xs[only].clone());
            out_ys.push(minority_label);
        }
        return Ok((out_xs, out_ys));
    }

    let neighbors = nearest_neighbors(xs, &minority_idx);
    let mut rng = StdRng::seed_from_u64(seed);

    for _ in 0..needed {
        let pick = rng.gen_range(0..minority_idx.len());
        let base = minority_idx[pick];
        let candidates = &neighbors[pick];
        let neighbor = candidates[rng.gen_range(0..candidates.len())];

        let lambda: f64 = rng.gen_range(0.0..1.0);
        let synthetic: Vec<f64> = xs[base]
            .iter()
            .zip(xs[neighbor].iter())
            .map(|(a, b)| a + lambda * (b - a))
            .collect();

        out_xs.push(synthetic);
        out_ys.push(minority_label);
    }

    Ok((out_xs, out_ys))
}

fn minority_class(ys: &[f64]) -> Option<f64> {
    let positives = ys.iter().filter(|&&y| y == 1.0).count();
    let negatives = ys.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }
    Some(if positives <= negatives { 1.0 } else { 0.0 })
}

/// For each minority row, the indices (into `xs`) of its k nearest minority
/// neighbors. Brute force; minority populations here are small.
fn nearest_neighbors(xs: &[Vec<f64>], minority_idx: &[usize]) -> Vec<Vec<usize>> {
    let k = K_NEIGHBORS.min(minority_idx.len() - 1);
    minority_idx
        .iter()
        .map(|&i| {
            let mut dists: Vec<(f64, usize)> = minority_idx
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| (squared_distance(&xs[i], &xs[j]), j))
                .collect();
            dists.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
            dists.truncate(k);
            dists.into_iter().map(|(_, j)| j).collect()
        })
        .collect()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
