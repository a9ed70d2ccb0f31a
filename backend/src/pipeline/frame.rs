// =============================================================================
// Indicator Calculator — clean series in, index-aligned indicator frame out
// =============================================================================
//
// Every column has the same length as the series.  `None` marks an index
// where the indicator is undefined:
//   - EMA / MACD / signal: never; both EMA conventions are defined from the
//     first bar.
//   - RSI: indices 0..rsi_period.
// =============================================================================

use serde::Serialize;

use super::error::PipelineError;
use crate::indicators::ema::calculate_ema;
use crate::indicators::macd::calculate_macd;
use crate::indicators::rsi::calculate_rsi;
use crate::market_data::Series;
use crate::runtime_config::PipelineConfig;

/// Indicator columns aligned index-for-index with a [`Series`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorFrame {
    /// EMA over the fast chart span (EMA20 by default).
    pub ema_fast: Vec<Option<f64>>,
    /// EMA over the slow chart span (EMA50 by default).
    pub ema_slow: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

/// One row of an [`IndicatorFrame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRow {
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub signal: Option<f64>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.ema_fast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema_fast.is_empty()
    }

    pub fn row(&self, i: usize) -> Option<FrameRow> {
        Some(FrameRow {
            ema_fast: *self.ema_fast.get(i)?,
            ema_slow: *self.ema_slow.get(i)?,
            rsi: *self.rsi.get(i)?,
            macd: *self.macd.get(i)?,
            signal: *self.signal.get(i)?,
        })
    }

    pub fn last(&self) -> Option<FrameRow> {
        self.row(self.len().checked_sub(1)?)
    }
}

/// Compute every indicator column for `series`.
pub fn compute_frame(
    series: &Series,
    config: &PipelineConfig,
) -> Result<IndicatorFrame, PipelineError> {
    let closes = series.closes();
    if closes.is_empty() {
        return Err(PipelineError::computation("no bars to compute indicators on"));
    }

    let conv = config.ewma_convention;
    let [fast_span, slow_span] = config.ema_spans;

    let ema_fast = finite_column("EMA fast", calculate_ema(&closes, fast_span, conv), closes.len())?;
    let ema_slow = finite_column("EMA slow", calculate_ema(&closes, slow_span, conv), closes.len())?;

    // The last close is never a divisor.
    if let Some(i) = closes[..closes.len() - 1].iter().position(|&c| c == 0.0) {
        return Err(PipelineError::computation(format!(
            "close at bar {i} is zero, percentage change is undefined"
        )));
    }
    let rsi = calculate_rsi(&closes, config.rsi_period).ok_or_else(|| {
        PipelineError::computation(format!("RSI({}) produced a non-finite value", config.rsi_period))
    })?;

    let spans = config.macd_spans;
    let macd = calculate_macd(&closes, spans.fast, spans.slow, spans.signal, conv).ok_or_else(
        || {
            PipelineError::computation(format!(
                "MACD({}, {}, {}) spans are invalid",
                spans.fast, spans.slow, spans.signal
            ))
        },
    )?;
    let signal = finite_column("MACD signal", macd.signal, closes.len())?;
    let macd = finite_column("MACD", macd.macd, closes.len())?;

    Ok(IndicatorFrame {
        ema_fast,
        ema_slow,
        rsi,
        macd,
        signal,
    })
}

/// Wrap a fully defined column, rejecting wrong lengths and non-finite values.
fn finite_column(
    name: &str,
    values: Vec<f64>,
    expected_len: usize,
) -> Result<Vec<Option<f64>>, PipelineError> {
    if values.len() != expected_len {
        return Err(PipelineError::computation(format!(
            "{name} has {} values for {expected_len} bars",
            values.len()
        )));
    }
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(PipelineError::computation(format!(
            "{name} is non-finite at bar {i}"
        )));
    }
    Ok(values.into_iter().map(Some).collect())
}
