//! Synthetic behavioral dataset generation.
//!
//! Produces a labeled population consistent with the feature registry. Each
//! feature distribution shifts with a latent risk score, so the default label
//! carries a learnable signal instead of being independent noise. The default
//! class is an intentional minority; training corrects for that downstream.

use crate::error::EngineError;
use crate::registry::{ActivityLevel, FEATURE_COUNT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Distribution, LogNormal, Normal, Poisson};

/// One labeled behavioral record. Produced only during generation and
/// immutable afterward.
#[derive(Debug, Clone)]
pub struct BehavioralRecord {
    pub ecom_txn_count: f64,
    pub ecom_spend: f64,
    pub ecom_refund_rate: f64,
    pub ecom_category_diversity: f64,
    pub utility_on_time_ratio: f64,
    pub utility_avg_days_late: f64,
    pub utility_bill_volatility: f64,
    pub wallet_txn_count: f64,
    pub wallet_txn_share: f64,
    pub wallet_balance_volatility: f64,
    pub income_monthly: f64,
    pub inflow_volatility: f64,
    pub outflow_volatility: f64,
    pub net_cash_margin: f64,
    pub sm_post_freq: f64,
    pub sm_engagement_score: f64,
    pub sm_account_age_years: f64,
    pub sm_activity_level: ActivityLevel,

    /// Composite of wallet share, e-commerce activity and engagement,
    /// normalized over the generated population. Not a model feature; used
    /// for fairness grouping.
    pub digital_adoption_score: f64,

    /// Binary outcome label: defaulted within the observation window.
    pub defaulted: bool,
}

impl BehavioralRecord {
    /// Feature vector in canonical registry order; activity level encoded
    /// ordinally.
    pub fn feature_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.ecom_txn_count,
            self.ecom_spend,
            self.ecom_refund_rate,
            self.ecom_category_diversity,
            self.utility_on_time_ratio,
            self.utility_avg_days_late,
            self.utility_bill_volatility,
            self.wallet_txn_count,
            self.wallet_txn_share,
            self.wallet_balance_volatility,
            self.income_monthly,
            self.inflow_volatility,
            self.outflow_volatility,
            self.net_cash_margin,
            self.sm_post_freq,
            self.sm_engagement_score,
            self.sm_account_age_years,
            self.sm_activity_level.as_ordinal(),
        ]
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn dist_err(e: impl std::fmt::Display) -> EngineError {
    EngineError::Internal(format!("invalid distribution parameters: {}", e))
}

/// Base draws for a single record before population-level normalization.
struct RawDraws {
    ecom_txn: f64,
    ecom_spend: f64,
    refund_rate: f64,
    cat_diversity: f64,
    on_time: f64,
    days_late: f64,
    utility_vol: f64,
    wallet_txn: f64,
    wallet_share: f64,
    wallet_vol: f64,
    income: f64,
    inflow_vol: f64,
    outflow_vol: f64,
    net_margin: f64,
    post_freq: f64,
    engagement: f64,
    account_age: f64,
}

/// Deterministic generator for labeled behavioral populations.
pub struct SyntheticDataGenerator;

impl SyntheticDataGenerator {
    /// Generate `n` labeled records from the given seed.
    ///
    /// Identical `(n, seed)` inputs yield identical populations. An empty
    /// request is rejected; no partial dataset is ever returned.
    pub fn generate(n: usize, seed: u64) -> Result<Vec<BehavioralRecord>, EngineError> {
        if n == 0 {
            return Err(EngineError::validation(
                "dataset size must be greater than zero",
            ));
        }

        let mut rng = StdRng::seed_from_u64(seed);

        let income_dist = LogNormal::new(10.0, 0.4).map_err(dist_err)?;
        let ecom_txn_dist = Poisson::new(15.0).map_err(dist_err)?;
        let refund_dist: Beta<f64> = Beta::new(1.5, 15.0).map_err(dist_err)?;
        let on_time_dist = Beta::new(8.0, 2.0).map_err(dist_err)?;
        let days_late_dist: Normal<f64> = Normal::new(2.0, 3.0).map_err(dist_err)?;
        let utility_vol_dist = LogNormal::new(2.0, 0.5).map_err(dist_err)?;
        let wallet_txn_dist = Poisson::new(10.0).map_err(dist_err)?;
        let wallet_share_dist: Beta<f64> = Beta::new(2.0, 2.0).map_err(dist_err)?;
        let wallet_vol_dist = LogNormal::new(1.0, 0.7).map_err(dist_err)?;
        let flow_vol_dist = LogNormal::new(1.0, 0.6).map_err(dist_err)?;
        let net_margin_dist = Normal::new(0.15, 0.1).map_err(dist_err)?;
        let post_freq_dist = Poisson::new(5.0).map_err(dist_err)?;
        let engagement_dist = LogNormal::new(0.0, 0.7).map_err(dist_err)?;

        let mut draws: Vec<RawDraws> = Vec::with_capacity(n);
        for _ in 0..n {
            let income: f64 = income_dist.sample(&mut rng);
            draws.push(RawDraws {
                ecom_txn: ecom_txn_dist.sample(&mut rng),
                ecom_spend: income * rng.gen_range(0.05..0.3),
                refund_rate: refund_dist.sample(&mut rng).clamp(0.0, 0.4),
                cat_diversity: rng.gen_range(1..10) as f64,
                on_time: on_time_dist.sample(&mut rng),
                days_late: days_late_dist.sample(&mut rng).max(0.0),
                utility_vol: utility_vol_dist.sample(&mut rng),
                wallet_txn: wallet_txn_dist.sample(&mut rng),
                wallet_share: wallet_share_dist.sample(&mut rng).clamp(0.0, 1.0),
                wallet_vol: wallet_vol_dist.sample(&mut rng),
                income,
                inflow_vol: flow_vol_dist.sample(&mut rng),
                outflow_vol: flow_vol_dist.sample(&mut rng),
                net_margin: net_margin_dist.sample(&mut rng),
                post_freq: post_freq_dist.sample(&mut rng),
                engagement: engagement_dist.sample(&mut rng),
                account_age: rng.gen_range(0.5..10.0),
            });
        }

        // Population maxima for the normalized composite and risk terms.
        let eps = 1e-6;
        let max_ecom_txn = draws.iter().map(|d| d.ecom_txn).fold(0.0, f64::max) + eps;
        let max_engagement = draws.iter().map(|d| d.engagement).fold(0.0, f64::max) + eps;
        let max_utility_vol = draws.iter().map(|d| d.utility_vol).fold(0.0, f64::max) + eps;
        let max_inflow_vol = draws.iter().map(|d| d.inflow_vol).fold(0.0, f64::max) + eps;
        let max_outflow_vol = draws.iter().map(|d| d.outflow_vol).fold(0.0, f64::max) + eps;

        let mut records = Vec::with_capacity(n);
        for d in draws {
            let activity = if d.post_freq < 3.0 {
                ActivityLevel::Low
            } else if d.post_freq < 7.0 {
                ActivityLevel::Medium
            } else {
                ActivityLevel::High
            };

            let digital_adoption = 0.4 * d.wallet_share
                + 0.3 * (d.ecom_txn / max_ecom_txn)
                + 0.3 * (d.engagement / max_engagement);

            // Latent risk: the engineered signal the classifier must learn.
            let risk = 1.5 * d.refund_rate - 1.2 * d.on_time
                + 0.05 * d.days_late
                + 0.4 * (d.utility_vol / max_utility_vol)
                - 0.000002 * d.income
                - 0.8 * d.net_margin
                + 0.3 * (d.inflow_vol / max_inflow_vol)
                + 0.3 * (d.outflow_vol / max_outflow_vol)
                - 0.5 * digital_adoption;

            let default_prob = sigmoid(risk * 3.0).clamp(0.01, 0.8);
            let defaulted = rng.gen_bool(default_prob);

            records.push(BehavioralRecord {
                ecom_txn_count: d.ecom_txn,
                ecom_spend: d.ecom_spend,
                ecom_refund_rate: d.refund_rate,
                ecom_category_diversity: d.cat_diversity,
                utility_on_time_ratio: d.on_time,
                utility_avg_days_late: d.days_late,
                utility_bill_volatility: d.utility_vol,
                wallet_txn_count: d.wallet_txn,
                wallet_txn_share: d.wallet_share,
                wallet_balance_volatility: d.wallet_vol,
                income_monthly: d.income,
                inflow_volatility: d.inflow_vol,
                outflow_volatility: d.outflow_vol,
                net_cash_margin: d.net_margin,
                sm_post_freq: d.post_freq,
                sm_engagement_score: d.engagement,
                sm_account_age_years: d.account_age,
                sm_activity_level: activity,
                digital_adoption_score: digital_adoption,
                defaulted,
            });
        }

        Ok(records)
    }
}
