// =============================================================================
// Validator — candidate series in, clean series or classified rejection out
// =============================================================================
//
// Checks run in a fixed order so each input maps to exactly one outcome:
//
//   1. no bars at all                  => EmptySeries
//   2. no close column in the schema   => MissingField
//   3. no finite close anywhere        => AllValuesMissing
//   4. drop bars without a finite close (order preserved)
//   5. fewer than `min_history` left   => InsufficientHistory
// =============================================================================

use tracing::debug;

use super::error::PipelineError;
use crate::market_data::{Bar, CandidateSeries, Series};

/// Validate and clean `candidate`, requiring at least `min_history` usable
/// bars.
pub fn validate(candidate: &CandidateSeries, min_history: usize) -> Result<Series, PipelineError> {
    if candidate.is_empty() {
        return Err(PipelineError::EmptySeries);
    }
    if !candidate.has_close {
        return Err(PipelineError::MissingField { field: "close" });
    }

    let bars: Vec<Bar> = candidate.bars.iter().filter_map(Bar::from_candidate).collect();
    if bars.is_empty() {
        return Err(PipelineError::AllValuesMissing);
    }

    let dropped = candidate.len() - bars.len();
    if dropped > 0 {
        debug!(dropped, kept = bars.len(), "dropped bars without a finite close");
    }

    if bars.len() < min_history {
        return Err(PipelineError::InsufficientHistory {
            required: min_history,
            available: bars.len(),
        });
    }

    Ok(Series::from_bars(bars))
}
