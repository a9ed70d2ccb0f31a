// =============================================================================
// Signal Derivation — last frame row in, three labelled signals out
// =============================================================================
//
//   ema_trend  = Bullish if EMA_fast > EMA_slow, else Bearish (ties => Bearish)
//   rsi_value  = RSI rounded to 2 decimals, or None when undefined
//   macd_trend = Buy if MACD > signal, Sell otherwise,
//                NotAvailable if either line is undefined
// =============================================================================

use serde::Serialize;

use super::error::PipelineError;
use super::frame::IndicatorFrame;
use crate::types::{EmaTrend, MacdTrend};

/// Signals derived from the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalSummary {
    pub ema_trend: EmaTrend,
    pub rsi_value: Option<f64>,
    pub macd_trend: MacdTrend,
}

/// Derive the summary from the last row of `frame`.
pub fn derive_summary(frame: &IndicatorFrame) -> Result<SignalSummary, PipelineError> {
    let last = frame
        .last()
        .ok_or_else(|| PipelineError::computation("indicator frame is empty"))?;

    let (Some(fast), Some(slow)) = (last.ema_fast, last.ema_slow) else {
        return Err(PipelineError::computation("EMA undefined on the last bar"));
    };
    let ema_trend = if fast > slow {
        EmaTrend::Bullish
    } else {
        EmaTrend::Bearish
    };

    let rsi_value = last.rsi.map(round2);

    let macd_trend = match (last.macd, last.signal) {
        (Some(macd), Some(signal)) if macd > signal => MacdTrend::Buy,
        (Some(_), Some(_)) => MacdTrend::Sell,
        _ => MacdTrend::NotAvailable,
    };

    Ok(SignalSummary {
        ema_trend,
        rsi_value,
        macd_trend,
    })
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
