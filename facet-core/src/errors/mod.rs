//! Analysis errors.

pub mod error_code;

use error_code::FacetErrorCode;

/// Errors surfaced by the analysis engine.
///
/// Per-file failures in pipeline stages are captured into the per-file
/// record and never fail the whole run; only bootstrap failures
/// (invalid inputs) are fatal.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error("CFG construction failed for `{function}`: {reason}")]
    BuildFailure { function: String, reason: String },

    #[error("Cancelled during {stage}")]
    Cancelled { stage: String },

    #[error("Recursion limit {limit} exceeded at depth {depth}")]
    LimitExceeded { limit: usize, depth: usize },
}

impl AnalysisError {
    pub fn invalid_input(what: impl Into<String>) -> Self {
        Self::InvalidInput { what: what.into() }
    }

    pub fn build_failure(function: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BuildFailure {
            function: function.into(),
            reason: reason.into(),
        }
    }

    pub fn cancelled(stage: impl Into<String>) -> Self {
        Self::Cancelled { stage: stage.into() }
    }
}

impl FacetErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "FACET_INVALID_INPUT",
            Self::BuildFailure { .. } => "FACET_BUILD_FAILURE",
            Self::Cancelled { .. } => "FACET_CANCELLED",
            Self::LimitExceeded { .. } => "FACET_LIMIT_EXCEEDED",
        }
    }
}
