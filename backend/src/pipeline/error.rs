use thiserror::Error;

// ============================================================================
// Error Type
// ============================================================================

/// Why a pipeline run produced no result.  Every variant is terminal for the
/// run; nothing partial is rendered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("price series is empty")]
    EmptySeries,
    #[error("price series has no '{field}' field")]
    MissingField { field: &'static str },
    #[error("every close price is missing or non-finite")]
    AllValuesMissing,
    #[error("need at least {required} clean bars, have {available}")]
    InsufficientHistory { required: usize, available: usize },
    #[error("indicator computation failed: {0}")]
    ComputationError(String),
}

impl PipelineError {
    /// Stable machine-readable name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptySeries => "empty_series",
            Self::MissingField { .. } => "missing_field",
            Self::AllValuesMissing => "all_values_missing",
            Self::InsufficientHistory { .. } => "insufficient_history",
            Self::ComputationError(_) => "computation_error",
        }
    }

    pub(crate) fn computation(msg: impl Into<String>) -> Self {
        Self::ComputationError(msg.into())
    }
}
