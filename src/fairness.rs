//! Fairness auditing across demographic-proxy groups.
//!
//! Works on the scored validation population of a generation. Income
//! quartiles are equal-count bins of the income feature; digital-adoption
//! tiers come from fixed thresholds on the adoption composite. The approval
//! cutoff is the same score the risk-band policy treats as `Low` or better.

use crate::types::dashboard::{FairnessGroupMetrics, FairnessReport};
use crate::types::score::RiskBand;

/// Fixed tier boundaries on the digital-adoption composite (which lives in
/// [0, 1] by construction).
const ADOPTION_MEDIUM_CUTOFF: f64 = 0.35;
const ADOPTION_HIGH_CUTOFF: f64 = 0.55;

/// Reference groups: highest income quartile, highest adoption tier.
const INCOME_REFERENCE: &str = "Q4";
const ADOPTION_REFERENCE: &str = "high";

/// One scored validation instance, reduced to what the audit needs.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub income_monthly: f64,
    pub digital_adoption_score: f64,
    pub score: f64,
}

impl ScoredRecord {
    fn approved(&self) -> bool {
        self.score >= RiskBand::APPROVAL_CUTOFF
    }
}

/// Compute both fairness tables for a scored validation population.
pub fn audit(scored: &[ScoredRecord]) -> FairnessReport {
    FairnessReport {
        income_quartiles: income_quartile_metrics(scored),
        digital_adoption_groups: adoption_tier_metrics(scored),
    }
}

/// Sort by income and split into four equal-count bins, Q1 lowest income
/// through Q4 highest. Remainders go to the earlier bins, keeping every bin
/// within one record of n/4. Fewer than four records cannot populate every
/// quartile, so the table is empty rather than built against a missing
/// reference group.
fn income_quartile_metrics(scored: &[ScoredRecord]) -> Vec<FairnessGroupMetrics> {
    if scored.len() < 4 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..scored.len()).collect();
    order.sort_by(|&a, &b| {
        scored[a]
            .income_monthly
            .partial_cmp(&scored[b].income_monthly)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let n = order.len();
    let base = n / 4;
    let remainder = n % 4;

    let mut groups: Vec<(String, Vec<&ScoredRecord>)> = Vec::with_capacity(4);
    let mut start = 0;
    for q in 0..4 {
        let size = base + usize::from(q < remainder);
        let members = order[start..start + size]
            .iter()
            .map(|&i| &scored[i])
            .collect();
        groups.push((format!("Q{}", q + 1), members));
        start += size;
    }

    build_metrics(&groups, INCOME_REFERENCE)
}

fn adoption_tier(record: &ScoredRecord) -> &'static str {
    if record.digital_adoption_score < ADOPTION_MEDIUM_CUTOFF {
        "low"
    } else if record.digital_adoption_score < ADOPTION_HIGH_CUTOFF {
        "medium"
    } else {
        "high"
    }
}

fn adoption_tier_metrics(scored: &[ScoredRecord]) -> Vec<FairnessGroupMetrics> {
    let groups: Vec<(String, Vec<&ScoredRecord>)> = ["low", "medium", "high"]
        .iter()
        .map(|&tier| {
            let members = scored.iter().filter(|r| adoption_tier(r) == tier).collect();
            (tier.to_string(), members)
        })
        .collect();

    build_metrics(&groups, ADOPTION_REFERENCE)
}

/// Group statistics plus the disparate-impact ratio against the reference
/// group. Given a populated reference group, the ratio is `None` exactly
/// when the reference approval rate is zero; it is never coerced to a
/// number. An absent reference group (possible for adoption tiers) also
/// yields `None`. Empty groups are skipped.
fn build_metrics(
    groups: &[(String, Vec<&ScoredRecord>)],
    reference: &str,
) -> Vec<FairnessGroupMetrics> {
    let reference_rate = groups
        .iter()
        .find(|(name, members)| name.as_str() == reference && !members.is_empty())
        .map(|(_, members)| approval_rate(members));

    groups
        .iter()
        .filter(|(_, members)| !members.is_empty())
        .map(|(name, members)| {
            let rate = approval_rate(members);
            let avg_score =
                members.iter().map(|r| r.score).sum::<f64>() / members.len() as f64;
            let ratio = match reference_rate {
                Some(reference_rate) if reference_rate > 0.0 => Some(rate / reference_rate),
                _ => None,
            };
            FairnessGroupMetrics {
                group: name.clone(),
                n: members.len(),
                avg_score,
                approval_rate: rate,
                disparate_impact_ratio: ratio,
            }
        })
        .collect()
}

fn approval_rate(members: &[&ScoredRecord]) -> f64 {
    members.iter().filter(|r| r.approved()).count() as f64 / members.len() as f64
}
