// =============================================================================
// Shared types used across the gold signal dashboard
// =============================================================================

use serde::{Deserialize, Serialize};

/// Direction of the fast EMA relative to the slow EMA on the last bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmaTrend {
    Bullish,
    Bearish,
}

impl std::fmt::Display for EmaTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Bearish => write!(f, "Bearish"),
        }
    }
}

/// MACD versus signal-line crossover state on the last bar.
///
/// `NotAvailable` is emitted whenever either line is undefined; it never
/// silently collapses into `Sell`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacdTrend {
    Buy,
    Sell,
    NotAvailable,
}

impl std::fmt::Display for MacdTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Sell => write!(f, "Sell"),
            Self::NotAvailable => write!(f, "{NOT_AVAILABLE}"),
        }
    }
}

/// Weighting convention for every exponentially weighted average in the
/// pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EwmaConvention {
    /// Weight-normalised early terms.
    Adjusted,
    /// Classic recursive form seeded with the first observation.
    #[default]
    Unadjusted,
}

impl std::fmt::Display for EwmaConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Adjusted => write!(f, "adjusted"),
            Self::Unadjusted => write!(f, "unadjusted"),
        }
    }
}

/// Display marker for a value that could not be computed.
pub const NOT_AVAILABLE: &str = "N/A";
