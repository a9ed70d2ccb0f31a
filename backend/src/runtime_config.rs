// =============================================================================
// Runtime Configuration — dashboard settings with atomic save
// =============================================================================
//
// Everything the dashboard can be tuned with lives here and is handed to the
// subsystems explicitly: page text for the renderer, the market data request,
// and the indicator pipeline options.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::market_data::BarRequest;
use crate::types::EwmaConvention;
use crate::yahoo::client::DEFAULT_BASE_URL;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_title() -> String {
    "Gold (XAU/USD) Dashboard".to_string()
}

fn default_heading() -> String {
    "Gold (XAU/USD) Daily Analysis".to_string()
}

fn default_subtitle() -> String {
    "Powered by top indicators | Dark Mode".to_string()
}

fn default_footer() -> String {
    "Live gold insights powered by Yahoo Finance".to_string()
}

fn default_theme() -> String {
    "dark".to_string()
}

fn default_symbol() -> String {
    "GC=F".to_string()
}

fn default_range() -> String {
    "7d".to_string()
}

fn default_interval() -> String {
    "1h".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_min_history() -> usize {
    50
}

fn default_ema_spans() -> [usize; 2] {
    [20, 50]
}

fn default_rsi_period() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

// =============================================================================
// PageConfig
// =============================================================================

/// Page text handed to the renderer verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_heading")]
    pub heading: String,

    #[serde(default = "default_subtitle")]
    pub subtitle: String,

    #[serde(default = "default_footer")]
    pub footer: String,

    /// Renderer theme name.  Opaque to this service.
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            heading: default_heading(),
            subtitle: default_subtitle(),
            footer: default_footer(),
            theme: default_theme(),
        }
    }
}

// =============================================================================
// SourceConfig
// =============================================================================

/// Market data request and provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Provider ticker, e.g. `GC=F` for COMEX gold futures.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Look-back window in provider vocabulary (`5d`, `7d`, ...).
    #[serde(default = "default_range")]
    pub range: String,

    /// Bar interval in provider vocabulary (`5m`, `1h`, ...).
    #[serde(default = "default_interval")]
    pub interval: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            range: default_range(),
            interval: default_interval(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SourceConfig {
    pub fn bar_request(&self) -> BarRequest {
        BarRequest {
            symbol: self.symbol.clone(),
            range: self.range.clone(),
            interval: self.interval.clone(),
        }
    }
}

// =============================================================================
// PipelineConfig
// =============================================================================

/// MACD fast / slow / signal spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdSpans {
    #[serde(default = "default_macd_fast")]
    pub fast: usize,

    #[serde(default = "default_macd_slow")]
    pub slow: usize,

    #[serde(default = "default_macd_signal")]
    pub signal: usize,
}

impl Default for MacdSpans {
    fn default() -> Self {
        Self {
            fast: default_macd_fast(),
            slow: default_macd_slow(),
            signal: default_macd_signal(),
        }
    }
}

/// Options for the indicator pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Weighting convention shared by every EMA in the pipeline.
    #[serde(default)]
    pub ewma_convention: EwmaConvention,

    /// Minimum number of clean bars required before indicators are computed.
    #[serde(default = "default_min_history")]
    pub min_history: usize,

    /// `[fast, slow]` spans of the two chart EMAs.
    #[serde(default = "default_ema_spans")]
    pub ema_spans: [usize; 2],

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default)]
    pub macd_spans: MacdSpans,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ewma_convention: EwmaConvention::default(),
            min_history: default_min_history(),
            ema_spans: default_ema_spans(),
            rsi_period: default_rsi_period(),
            macd_spans: MacdSpans::default(),
        }
    }
}

impl PipelineConfig {
    /// Reject settings the indicator math cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.min_history == 0 {
            anyhow::bail!("min_history must be at least 1");
        }
        if self.ema_spans.contains(&0) {
            anyhow::bail!("ema_spans must be non-zero, got {:?}", self.ema_spans);
        }
        if self.rsi_period == 0 {
            anyhow::bail!("rsi_period must be at least 1");
        }
        let MacdSpans { fast, slow, signal } = self.macd_spans;
        if fast == 0 || slow == 0 || signal == 0 {
            anyhow::bail!("macd_spans must be non-zero, got {fast}/{slow}/{signal}");
        }
        if fast >= slow {
            anyhow::bail!("macd fast span ({fast}) must be below slow span ({slow})");
        }
        Ok(())
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the dashboard service.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Address the HTTP API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            source: SourceConfig::default(),
            pipeline: PipelineConfig::default(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist or the pipeline options are invalid,
    /// returns an error so the caller can fall back to defaults with a
    /// warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dashboard config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dashboard config from {}", path.display()))?;

        config
            .pipeline
            .validate()
            .with_context(|| format!("invalid pipeline options in {}", path.display()))?;

        info!(
            path = %path.display(),
            symbol = %config.source.symbol,
            convention = %config.pipeline.ewma_convention,
            min_history = config.pipeline.min_history,
            "dashboard config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise dashboard config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "dashboard config saved (atomic)");
        Ok(())
    }
}

/// Result of reading the config file at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct StartupConfig {
    /// Configuration as it stands on disk, or defaults.
    pub config: RuntimeConfig,
    /// False when a file exists but could not be used; it must not be
    /// overwritten on shutdown.
    pub writable: bool,
}

impl RuntimeConfig {
    /// Load `path`, falling back to defaults.  A missing file is created on
    /// the next save; a file that exists but fails to load is left untouched.
    pub fn load_for_startup(path: impl AsRef<Path>) -> StartupConfig {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => StartupConfig { config, writable: true },
            Err(_) if !path.exists() => {
                info!(path = %path.display(), "no dashboard config found, using defaults");
                StartupConfig { config: Self::default(), writable: true }
            }
            Err(e) => {
                warn!(
                    error = ?e,
                    path = %path.display(),
                    "Failed to load config, using defaults; the file will not be overwritten"
                );
                StartupConfig { config: Self::default(), writable: false }
            }
        }
    }
}

// =============================================================================
// Environment overrides
// =============================================================================

/// Settings taken from the process environment.  They apply to this process
/// only and are never written back to the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub symbol: Option<String>,
    pub bind_addr: Option<String>,
}

impl EnvOverrides {
    /// Read `DASHBOARD_SYMBOL` and `DASHBOARD_BIND_ADDR`.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("DASHBOARD_SYMBOL").ok(),
            std::env::var("DASHBOARD_BIND_ADDR").ok(),
        )
    }

    /// Blank values are ignored; the symbol is upper-cased.
    pub fn new(symbol: Option<String>, bind_addr: Option<String>) -> Self {
        Self {
            symbol: symbol
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty()),
            bind_addr: bind_addr
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        }
    }

    pub fn apply(&self, config: &mut RuntimeConfig) {
        if let Some(symbol) = &self.symbol {
            config.source.symbol = symbol.clone();
        }
        if let Some(addr) = &self.bind_addr {
            config.bind_addr = addr.clone();
        }
    }

    /// `current` with every overridden field restored from `file`.  Edits
    /// made through the API to other fields are kept.
    pub fn strip(&self, current: &RuntimeConfig, file: &RuntimeConfig) -> RuntimeConfig {
        let mut out = current.clone();
        if self.symbol.is_some() {
            out.source.symbol = file.source.symbol.clone();
        }
        if self.bind_addr.is_some() {
            out.bind_addr = file.bind_addr.clone();
        }
        out
    }
}
