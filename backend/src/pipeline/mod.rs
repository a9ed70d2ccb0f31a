// =============================================================================
// Indicator Pipeline
// =============================================================================
//
// validate -> compute_frame -> derive_summary.  Pure and synchronous: the
// same candidate series and config always produce the same output, and no
// state survives between runs.

pub mod error;
pub mod frame;
pub mod signals;
pub mod validator;

pub use error::PipelineError;
pub use frame::{compute_frame, IndicatorFrame};
pub use signals::{derive_summary, SignalSummary};
pub use validator::validate;

use crate::market_data::{CandidateSeries, Series};
use crate::runtime_config::PipelineConfig;

/// Everything a successful run hands to the renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub series: Series,
    pub frame: IndicatorFrame,
    pub summary: SignalSummary,
}

/// Run the full pipeline on a candidate series.
pub fn run(
    candidate: &CandidateSeries,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError> {
    let series = validate(candidate, config.min_history)?;
    let frame = compute_frame(&series, config)?;
    let summary = derive_summary(&frame)?;
    Ok(PipelineOutput {
        series,
        frame,
        summary,
    })
}
