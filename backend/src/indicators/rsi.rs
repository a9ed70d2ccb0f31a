// =============================================================================
// Relative Strength Index (RSI) — percentage-change variant
// =============================================================================
//
// This is NOT Wilder's RSI.  Gains and losses are not averaged separately;
// instead the raw bar-to-bar percentage change is averaged over a trailing
// window and pushed through the RSI transform:
//
//   pct_t = (close_t - close_{t-1}) / close_{t-1}
//   m_t   = mean(pct_{t-period+1} ..= pct_t)
//   RSI_t = 100 - 100 / (1 + m_t)
//
// The dashboard has always published this number, so the formula is kept
// verbatim and its output is never clipped to [0, 100].  A flat market gives
// 0, a small uptrend gives a small positive value, and a mean change below -1
// gives a value above 100.
//
// Index 0 has no percentage change, so the first defined RSI is at index
// `period`.
// =============================================================================

/// Bar-to-bar fractional change of `closes`, index-aligned with the input.
///
/// Index 0 is always `None`.  Returns `None` overall when any previous close
/// is exactly zero (the change would be a division by zero).
pub fn pct_change(closes: &[f64]) -> Option<Vec<Option<f64>>> {
    let mut result = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return Some(result);
    }
    result.push(None);

    for w in closes.windows(2) {
        if w[0] == 0.0 {
            return None;
        }
        result.push(Some((w[1] - w[0]) / w[0]));
    }
    Some(result)
}

/// Compute the RSI series for `closes` with the given look-back `period`.
///
/// The output is index-aligned with `closes`; indices `0..period` are `None`.
///
/// # Edge cases
/// - `period == 0` => `None`
/// - a zero previous close => `None` (division by zero)
/// - a non-finite RSI value (mean change of exactly -1) => `None`
/// - `closes.len() <= period` => every element is `None`
pub fn calculate_rsi(closes: &[f64], period: usize) -> Option<Vec<Option<f64>>> {
    if period == 0 {
        return None;
    }

    let changes = pct_change(closes)?;
    let mut result = vec![None; closes.len()];

    for i in period..closes.len() {
        // Window covers changes (i - period, i]; all are defined because
        // i - period + 1 >= 1.
        let window = &changes[i + 1 - period..=i];
        let sum: f64 = window.iter().map(|c| c.unwrap_or(f64::NAN)).sum();
        let mean = sum / period as f64;

        let rsi = rsi_from_mean_change(mean);
        if !rsi.is_finite() {
            return None;
        }
        result[i] = Some(rsi);
    }

    Some(result)
}

/// The RSI transform applied to a mean fractional change.
pub fn rsi_from_mean_change(mean_change: f64) -> f64 {
    100.0 - 100.0 / (1.0 + mean_change)
}
