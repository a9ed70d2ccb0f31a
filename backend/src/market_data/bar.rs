use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One OHLC observation exactly as the provider delivered it.
///
/// Any field may be missing; the provider encodes gaps as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateBar {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
}

/// Unvalidated provider output.
///
/// `has_close` records whether the close column exists in the response
/// schema at all, which is distinct from every close value being `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSeries {
    pub has_close: bool,
    pub bars: Vec<CandidateBar>,
}

impl CandidateSeries {
    pub fn new(bars: Vec<CandidateBar>) -> Self {
        Self {
            has_close: true,
            bars,
        }
    }

    /// A response that carried no usable data at all.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// A bar that survived validation: `close` is always finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
}

impl Bar {
    /// Promote a candidate bar, or `None` when its close is missing or
    /// non-finite.
    pub fn from_candidate(candidate: &CandidateBar) -> Option<Self> {
        let close = candidate.close.filter(|c| c.is_finite())?;
        Some(Self {
            timestamp: candidate.timestamp,
            open: candidate.open,
            high: candidate.high,
            low: candidate.low,
            close,
        })
    }
}

/// Cleaned, time-ordered bars.  Built by the validator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    pub(crate) fn from_bars(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Close prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Hourly candidate bars starting at a fixed instant, one per close.
    pub(crate) fn candidate_from_closes(closes: &[Option<f64>]) -> CandidateSeries {
        let start = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| CandidateBar {
                timestamp: start + chrono::Duration::hours(i as i64),
                open: close,
                high: close.map(|c| c + 1.0),
                low: close.map(|c| c - 1.0),
                close,
            })
            .collect();
        CandidateSeries::new(bars)
    }

    pub(crate) fn series_from_closes(closes: &[f64]) -> Series {
        let candidate =
            candidate_from_closes(&closes.iter().copied().map(Some).collect::<Vec<_>>());
        Series::from_bars(
            candidate
                .bars
                .iter()
                .filter_map(Bar::from_candidate)
                .collect(),
        )
    }

    #[test]
    fn from_candidate_rejects_missing_and_non_finite() {
        let c = candidate_from_closes(&[Some(1.0), None, Some(f64::NAN), Some(f64::INFINITY)]);
        let promoted: Vec<_> = c.bars.iter().map(Bar::from_candidate).collect();
        assert!(promoted[0].is_some());
        assert!(promoted[1].is_none());
        assert!(promoted[2].is_none());
        assert!(promoted[3].is_none());
    }

    #[test]
    fn series_closes_in_order() {
        let s = series_from_closes(&[3.0, 1.0, 2.0]);
        assert_eq!(s.closes(), vec![3.0, 1.0, 2.0]);
        assert_eq!(s.len(), 3);
        assert!(s.bars()[0].timestamp < s.bars()[1].timestamp);
    }
}
