// =============================================================================
// Market data source — the injected input collaborator
// =============================================================================

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::bar::CandidateSeries;

/// What to fetch: a ticker plus a look-back range and bar interval in the
/// provider's vocabulary (e.g. `"7d"` / `"1h"`, `"5d"` / `"5m"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarRequest {
    pub symbol: String,
    pub range: String,
    pub interval: String,
}

impl std::fmt::Display for BarRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}/{}", self.symbol, self.range, self.interval)
    }
}

/// Anything that can produce a candidate bar series for a request.
///
/// Network and decoding failures come back as `Err`; an answer with no bars
/// is an `Ok` empty series so that the validator can classify it.
#[async_trait]
pub trait MarketDataSource: Send + Sync + 'static {
    async fn fetch_bars(&self, request: &BarRequest) -> Result<CandidateSeries>;

    /// Short provider name for logs.
    fn name(&self) -> &str;
}
