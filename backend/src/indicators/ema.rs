// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
//   alpha = 2 / (span + 1)
//
// Unadjusted (recursive) form, seeded with the first observation:
//   EMA_0 = x_0
//   EMA_t = alpha * x_t + (1 - alpha) * EMA_{t-1}
//
// Adjusted form, early terms weight-normalised:
//   EMA_t = sum_k (1 - alpha)^k * x_{t-k} / sum_k (1 - alpha)^k
//
// Both are evaluated in a single pass as `prev + gain * (x - prev)`, which is
// algebraically identical to the textbook forms and keeps a constant input
// bit-for-bit constant.  Neither convention has a warm-up region: the output
// is defined from index 0 and has the same length as the input.
// =============================================================================

use crate::types::EwmaConvention;

/// Smoothing factor for a given span.  `None` when `span == 0`.
pub fn alpha(span: usize) -> Option<f64> {
    if span == 0 {
        return None;
    }
    Some(2.0 / (span as f64 + 1.0))
}

/// Compute the EMA series of `values` for `span` under `convention`.
///
/// Returns an empty `Vec` when the input is empty or the span is zero.
/// Otherwise the output is index-aligned with the input.  Non-finite inputs
/// propagate into the output; callers decide whether that is an error.
pub fn calculate_ema(values: &[f64], span: usize, convention: EwmaConvention) -> Vec<f64> {
    let Some(alpha) = alpha(span) else {
        return Vec::new();
    };
    let Some((&first, rest)) = values.split_first() else {
        return Vec::new();
    };

    let decay = 1.0 - alpha;
    let mut result = Vec::with_capacity(values.len());
    result.push(first);

    let mut prev = first;
    // Running sum of weights for the adjusted form: 1 + decay + decay^2 + ...
    let mut weight_sum = 1.0;

    for &x in rest {
        let gain = match convention {
            EwmaConvention::Unadjusted => alpha,
            EwmaConvention::Adjusted => {
                weight_sum = 1.0 + decay * weight_sum;
                1.0 / weight_sum
            }
        };
        let ema = prev + gain * (x - prev);
        result.push(ema);
        prev = ema;
    }

    result
}
