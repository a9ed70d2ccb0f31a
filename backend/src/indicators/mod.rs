// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators shown on the
// dashboard.  Series outputs are index-aligned with their input so that the
// pipeline can stack them into one frame.  Functions that can hit a numerical
// edge case return `Option` so callers are forced to handle it.

pub mod ema;
pub mod macd;
pub mod rsi;
