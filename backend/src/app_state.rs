// =============================================================================
// Application State — shared by every HTTP handler
// =============================================================================
//
// Only configuration and the market data source are shared.  Pipeline runs
// never write here beyond the run counters, so two requests can never see
// each other's intermediate results.
//
// Thread safety:
//   - Atomic counters for lock-free run accounting.
//   - parking_lot::RwLock for the runtime configuration; handlers clone what
//     they need and release the lock before any await point.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::market_data::MarketDataSource;
use crate::runtime_config::RuntimeConfig;

/// Shared application state, passed to handlers as `Arc<AppState>`.
pub struct AppState {
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,
    pub source: Arc<dyn MarketDataSource>,
    pub started_at: DateTime<Utc>,

    /// Dashboard runs attempted since start.
    runs_total: AtomicU64,
    /// Dashboard runs that ended in an error.
    runs_failed: AtomicU64,
}

impl AppState {
    pub fn new(config: RuntimeConfig, source: Arc<dyn MarketDataSource>) -> Self {
        Self {
            runtime_config: Arc::new(RwLock::new(config)),
            source,
            started_at: Utc::now(),
            runs_total: AtomicU64::new(0),
            runs_failed: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> RuntimeConfig {
        self.runtime_config.read().clone()
    }

    pub fn record_run(&self, ok: bool) {
        self.runs_total.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.runs_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn runs_total(&self) -> u64 {
        self.runs_total.load(Ordering::Relaxed)
    }

    pub fn runs_failed(&self) -> u64 {
        self.runs_failed.load(Ordering::Relaxed)
    }
}
