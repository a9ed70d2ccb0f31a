// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD   = EMA(fast) - EMA(slow)          (of close)
//   Signal = EMA(signal) of the MACD line
//
// Every EMA here uses the same weighting convention; mixing conventions
// produces crossovers that do not line up with the price chart.
// =============================================================================

use super::ema::calculate_ema;
use crate::types::EwmaConvention;

/// MACD line and its signal line, both index-aligned with the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

/// Compute MACD and its signal line.
///
/// Returns `None` when any span is zero or the input is empty.
pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
    convention: EwmaConvention,
) -> Option<MacdSeries> {
    if closes.is_empty() || fast == 0 || slow == 0 || signal == 0 {
        return None;
    }

    let fast_ema = calculate_ema(closes, fast, convention);
    let slow_ema = calculate_ema(closes, slow, convention);

    let macd: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal = calculate_ema(&macd, signal, convention);

    Some(MacdSeries { macd, signal })
}
