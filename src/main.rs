//! Credit Scoring Engine - Demo Entry Point
//!
//! Trains the first model generation at startup, publishes it, and exercises
//! the scoring and dashboard surfaces once.

use anyhow::Result;
use credit_scoring_engine::{
    config::AppConfig, dashboard::DashboardAggregator, generation::GenerationStore,
    model::TrainingPipeline, scoring::ScoringService, types::ScoreRequest,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("credit_scoring_engine=info".parse()?),
        )
        .init();

    info!("Starting Credit Scoring Engine");

    let config = AppConfig::load_or_default();
    info!(
        rows = config.training.rows,
        seed = config.training.seed,
        trees = config.training.n_trees,
        workers = config.pipeline.workers,
        "Configuration loaded"
    );

    let store = Arc::new(GenerationStore::new());

    // Train the first generation off the request path; nothing is visible
    // until publish.
    let pipeline = TrainingPipeline::new(config.training.clone());
    let version = store.next_version();
    let generation =
        tokio::task::spawn_blocking(move || pipeline.run(version)).await??;
    store.publish(generation);

    let scoring = ScoringService::new(store.clone(), &config.pipeline);
    let dashboard = DashboardAggregator::new(store.clone());

    let kpis = dashboard.portfolio_kpis()?;
    info!(
        auc = format!("{:.4}", kpis.auc),
        avg_score = format!("{:.1}", kpis.avg_score),
        default_rate = format!("{:.3}", kpis.default_rate),
        "Portfolio KPIs"
    );
    for item in &kpis.risk_band_distribution {
        info!(
            band = %item.band,
            count = item.count,
            pct = format!("{:.1}%", item.pct * 100.0),
            "Risk band share"
        );
    }

    let attribution = dashboard.global_attribution()?;
    for item in attribution.items.iter().take(5) {
        info!(
            feature = %item.feature_key,
            relative_importance = format!("{:.3}", item.relative_importance),
            "Global attribution driver"
        );
    }

    let fairness = dashboard.fairness()?;
    for group in &fairness.income_quartiles {
        info!(
            group = %group.group,
            n = group.n,
            approval_rate = format!("{:.3}", group.approval_rate),
            disparate_impact = ?group.disparate_impact_ratio,
            "Income quartile"
        );
    }

    // Score the baseline applicant through the worker pool.
    let result = scoring.score(ScoreRequest::baseline()).await?;
    info!(
        credit_score = format!("{:.1}", result.credit_score),
        risk_band = result.risk_band.as_str(),
        probability_default = format!("{:.4}", result.probability_default),
        model_version = %result.model_version,
        "Baseline applicant scored"
    );
    for explanation in &result.top_explanations {
        info!(
            feature = %explanation.feature_key,
            value = %explanation.value,
            shap_value = format!("{:+.4}", explanation.shap_value),
            impact = ?explanation.impact,
            "Top driver"
        );
    }

    Ok(())
}
