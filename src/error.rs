//! Error taxonomy for the scoring engine.

use std::time::Duration;

/// Failure kinds surfaced by the engine.
///
/// Each variant is local to a single request or a single training attempt;
/// none of them invalidate previously published state.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Input rejected before any inference ran (missing consent, value
    /// outside its declared domain, malformed shape).
    #[error("validation failed: {0}")]
    Validation(String),

    /// No model generation has been published yet; safe to retry later.
    #[error("no model generation published yet")]
    NotReady,

    /// Per-request computation budget exceeded; transient, safe to retry.
    #[error("scoring exceeded the {budget:?} computation budget")]
    Timeout { budget: Duration },

    /// A training run failed; the previous generation stays active.
    #[error("training failed: {0}")]
    Training(String),

    /// Unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn validation(reason: impl Into<String>) -> Self {
        EngineError::Validation(reason.into())
    }

    /// True when the caller may retry the identical request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::NotReady | EngineError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(EngineError::NotReady.is_retryable());
        assert!(EngineError::Timeout {
            budget: Duration::from_millis(500)
        }
        .is_retryable());
        assert!(!EngineError::validation("consent required").is_retryable());
        assert!(!EngineError::Training("split failed".into()).is_retryable());
    }

    #[test]
    fn test_display_messages() {
        let err = EngineError::validation("ecom_refund_rate: value must be within [0, 1]");
        assert!(err.to_string().contains("validation failed"));
        assert!(err.to_string().contains("ecom_refund_rate"));
    }
}
