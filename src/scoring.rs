//! Consent-gated per-request scoring.
//!
//! Requests are validated against the feature registry before any inference
//! runs. The CPU-bound model work goes through a bounded blocking pool sized
//! independently of the request-accepting layer, under a fixed time budget.

use crate::config::PipelineConfig;
use crate::error::EngineError;
use crate::explain;
use crate::generation::{GenerationStore, ModelGeneration};
use crate::registry;
use crate::types::request::ScoreRequest;
use crate::types::score::{probability_to_score, RiskBand, ScoreResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task;
use tokio::time::timeout;
use tracing::debug;

/// Scores single requests against the currently published generation.
pub struct ScoringService {
    store: Arc<GenerationStore>,
    workers: Arc<Semaphore>,
    budget: Duration,
}

impl ScoringService {
    pub fn new(store: Arc<GenerationStore>, config: &PipelineConfig) -> Self {
        Self {
            store,
            workers: Arc::new(Semaphore::new(config.workers.max(1))),
            budget: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Validate, then score the request against the published model.
    ///
    /// Consent is a hard precondition; out-of-domain values are rejected
    /// rather than clamped. A caller dropping the returned future frees its
    /// worker slot without interrupting in-flight inference.
    pub async fn score(&self, request: ScoreRequest) -> Result<ScoreResult, EngineError> {
        validate_request(&request)?;

        let generation = self.store.current().ok_or(EngineError::NotReady)?;

        self.run_budgeted(move || compute_score(&generation, &request))
            .await
    }

    /// Run CPU-bound work on the blocking pool under the worker limit and
    /// time budget. Elapsing the budget abandons the task rather than
    /// interrupting it.
    async fn run_budgeted<T, F>(&self, work: F) -> Result<T, EngineError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let permit = self
            .workers
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| EngineError::Internal("scoring worker pool is closed".into()))?;

        let budget = self.budget;
        let handle = task::spawn_blocking(work);

        let result = match timeout(budget, handle).await {
            Err(_) => Err(EngineError::Timeout { budget }),
            Ok(Err(join_error)) => Err(EngineError::Internal(format!(
                "scoring task failed: {}",
                join_error
            ))),
            Ok(Ok(result)) => Ok(result),
        };
        drop(permit);
        result
    }
}

/// Reject the request before inference when consent is missing or any value
/// falls outside its declared domain.
fn validate_request(request: &ScoreRequest) -> Result<(), EngineError> {
    if !request.consent {
        return Err(EngineError::validation(
            "consent is required to compute a credit score",
        ));
    }

    let vector = request.feature_vector();
    for (descriptor, &value) in registry::features().iter().zip(vector.iter()) {
        registry::check_domain(descriptor, value).map_err(EngineError::Validation)?;
    }
    Ok(())
}

/// Pure scoring computation against one immutable generation.
fn compute_score(generation: &ModelGeneration, request: &ScoreRequest) -> ScoreResult {
    let features = request.feature_vector();

    let probability_default = generation.model.predict_default_probability(&features);
    let probability_good = 1.0 - probability_default;

    let credit_score = probability_to_score(probability_good);
    let risk_band = RiskBand::from_score(credit_score);

    let top_explanations =
        explain::explain_instance(&generation.model, &features, &request.display_values());

    debug!(
        model_version = %generation.version,
        credit_score = credit_score,
        probability_default = probability_default,
        risk_band = risk_band.as_str(),
        "Request scored"
    );

    ScoreResult {
        credit_score,
        risk_band,
        probability_good,
        probability_default,
        top_explanations,
        model_version: generation.version.clone(),
    }
}
