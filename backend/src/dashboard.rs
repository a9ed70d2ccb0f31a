// =============================================================================
// Dashboard Report — renderer-ready output of one pipeline run
// =============================================================================
//
// A run either produces a full report (chart payload + summary table) or a
// classified error with a user-facing message.  Nothing partial is ever
// returned.  The page configuration is passed in with every run; this module
// holds no state of its own.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::market_data::{BarRequest, MarketDataSource, Series};
use crate::pipeline::{self, IndicatorFrame, PipelineError, PipelineOutput, SignalSummary};
use crate::runtime_config::{PageConfig, PipelineConfig};
use crate::types::NOT_AVAILABLE;

// =============================================================================
// Chart payload
// =============================================================================

pub const PRICE_TRACE: &str = "Price";

/// A named line overlaid on the candlesticks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineTrace {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// OHLC columns plus the two EMA overlays, all aligned by index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub price_trace: &'static str,
    pub timestamps: Vec<DateTime<Utc>>,
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<f64>,
    pub overlays: Vec<LineTrace>,
}

impl ChartPayload {
    pub fn new(series: &Series, frame: &IndicatorFrame, ema_spans: [usize; 2]) -> Self {
        let bars = series.bars();
        Self {
            price_trace: PRICE_TRACE,
            timestamps: bars.iter().map(|b| b.timestamp).collect(),
            open: bars.iter().map(|b| b.open).collect(),
            high: bars.iter().map(|b| b.high).collect(),
            low: bars.iter().map(|b| b.low).collect(),
            close: bars.iter().map(|b| b.close).collect(),
            overlays: vec![
                LineTrace {
                    name: format!("EMA {}", ema_spans[0]),
                    values: frame.ema_fast.clone(),
                },
                LineTrace {
                    name: format!("EMA {}", ema_spans[1]),
                    values: frame.ema_slow.clone(),
                },
            ],
        }
    }
}

// =============================================================================
// Summary table
// =============================================================================

/// A table cell: either text or a number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SummaryValue {
    Text(String),
    Number(f64),
}

/// One `(Indicator, Signal)` row of the summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub indicator: &'static str,
    pub signal: SummaryValue,
}

/// Summary rows in display order: EMA trend, RSI, MACD signal.
pub fn summary_rows(summary: &SignalSummary) -> Vec<SummaryRow> {
    let rsi = match summary.rsi_value {
        Some(v) => SummaryValue::Number(v),
        None => SummaryValue::Text(NOT_AVAILABLE.to_string()),
    };
    vec![
        SummaryRow {
            indicator: "EMA Trend",
            signal: SummaryValue::Text(summary.ema_trend.to_string()),
        },
        SummaryRow {
            indicator: "RSI",
            signal: rsi,
        },
        SummaryRow {
            indicator: "MACD Signal",
            signal: SummaryValue::Text(summary.macd_trend.to_string()),
        },
    ]
}

// =============================================================================
// Report
// =============================================================================

/// Complete renderer payload for one run.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    /// Unique identifier for this run (UUID v4).
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub page: PageConfig,
    pub request: BarRequest,
    pub bars: usize,
    pub chart: ChartPayload,
    pub summary: Vec<SummaryRow>,
}

impl DashboardReport {
    pub fn new(
        page: PageConfig,
        request: BarRequest,
        pipeline: &PipelineConfig,
        output: &PipelineOutput,
    ) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            page,
            request,
            bars: output.series.len(),
            chart: ChartPayload::new(&output.series, &output.frame, pipeline.ema_spans),
            summary: summary_rows(&output.summary),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Why a dashboard run produced no report.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("market data fetch failed: {0:#}")]
    Fetch(anyhow::Error),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// How loudly the renderer should present an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl DashboardError {
    /// Stable machine-readable name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch_failed",
            Self::Pipeline(e) => e.kind(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Pipeline(PipelineError::InsufficientHistory { .. }) => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Text shown to the dashboard user.  Distinct per kind.
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch(_) => {
                "Live gold price data is unavailable. Please try again later.".to_string()
            }
            Self::Pipeline(PipelineError::EmptySeries) => {
                "The data provider returned no price bars for this period.".to_string()
            }
            Self::Pipeline(PipelineError::MissingField { field }) => {
                format!("The data provider response has no {field} prices.")
            }
            Self::Pipeline(PipelineError::AllValuesMissing) => {
                "Every close price in the provider data is missing.".to_string()
            }
            Self::Pipeline(PipelineError::InsufficientHistory { .. }) => {
                "Not enough historical data to compute indicators.".to_string()
            }
            Self::Pipeline(PipelineError::ComputationError(detail)) => {
                format!("An error occurred during processing: {detail}")
            }
        }
    }
}

// =============================================================================
// One run
// =============================================================================

/// Fetch bars from `source` and run the pipeline once.
pub async fn build_report(
    source: &dyn MarketDataSource,
    request: BarRequest,
    page: PageConfig,
    pipeline_config: &PipelineConfig,
) -> Result<DashboardReport, DashboardError> {
    let candidate = source.fetch_bars(&request).await.map_err(|e| {
        warn!(provider = source.name(), request = %request, error = %e, "market data fetch failed");
        DashboardError::Fetch(e)
    })?;

    let output = pipeline::run(&candidate, pipeline_config).map_err(|e| {
        match &e {
            PipelineError::ComputationError(_) => {
                error!(request = %request, error = %e, "indicator pipeline failed")
            }
            _ => warn!(request = %request, bars = candidate.len(), error = %e, "price series rejected"),
        }
        DashboardError::from(e)
    })?;

    let report = DashboardReport::new(page, request, pipeline_config, &output);
    info!(
        run_id = %report.run_id,
        request = %report.request,
        bars = report.bars,
        ema_trend = %output.summary.ema_trend,
        rsi = ?output.summary.rsi_value,
        macd_trend = %output.summary.macd_trend,
        "dashboard report built"
    );
    Ok(report)
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::market_data::bar::tests::candidate_from_closes;
    use crate::market_data::CandidateSeries;
    use crate::runtime_config::SourceConfig;
    use crate::types::{EmaTrend, MacdTrend};
    use async_trait::async_trait;

    /// Source that always answers with the same series (or error).
    pub(crate) struct StaticSource {
        pub(crate) response: Result<CandidateSeries, String>,
    }

    #[async_trait]
    impl MarketDataSource for StaticSource {
        async fn fetch_bars(&self, _request: &BarRequest) -> anyhow::Result<CandidateSeries> {
            self.response.clone().map_err(anyhow::Error::msg)
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    pub(crate) fn rising_source(n: usize) -> StaticSource {
        let closes: Vec<Option<f64>> = (0..n).map(|i| Some(100.0 + 2.0 * i as f64)).collect();
        StaticSource {
            response: Ok(candidate_from_closes(&closes)),
        }
    }

    fn request() -> BarRequest {
        SourceConfig::default().bar_request()
    }

    #[tokio::test]
    async fn report_for_rising_market() {
        let report = build_report(
            &rising_source(60),
            request(),
            PageConfig::default(),
            &PipelineConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.bars, 60);
        assert_eq!(report.chart.close.len(), 60);
        assert_eq!(report.chart.overlays.len(), 2);
        assert_eq!(report.chart.overlays[0].name, "EMA 20");
        assert_eq!(report.chart.overlays[1].name, "EMA 50");
        assert_eq!(report.chart.overlays[1].values.len(), 60);

        let labels: Vec<_> = report.summary.iter().map(|r| r.indicator).collect();
        assert_eq!(labels, vec!["EMA Trend", "RSI", "MACD Signal"]);
        assert_eq!(report.summary[0].signal, SummaryValue::Text("Bullish".into()));
        assert_eq!(report.summary[2].signal, SummaryValue::Text("Buy".into()));
        assert!(matches!(report.summary[1].signal, SummaryValue::Number(_)));
    }

    #[tokio::test]
    async fn fetch_failure_is_classified() {
        let source = StaticSource {
            response: Err("connection reset".into()),
        };
        let err = build_report(&source, request(), PageConfig::default(), &PipelineConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "fetch_failed");
        assert_eq!(err.severity(), Severity::Error);
    }

    #[tokio::test]
    async fn short_history_is_a_warning() {
        let err = build_report(
            &rising_source(10),
            request(),
            PageConfig::default(),
            &PipelineConfig::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "insufficient_history");
        assert_eq!(err.severity(), Severity::Warning);
        assert_eq!(err.user_message(), "Not enough historical data to compute indicators.");
    }

    #[test]
    fn user_messages_are_distinct() {
        let errors = [
            DashboardError::Fetch(anyhow::anyhow!("boom")),
            PipelineError::EmptySeries.into(),
            PipelineError::MissingField { field: "close" }.into(),
            PipelineError::AllValuesMissing.into(),
            PipelineError::InsufficientHistory { required: 50, available: 3 }.into(),
            PipelineError::ComputationError("zero close".into()).into(),
        ];
        let mut messages: Vec<String> = errors.iter().map(DashboardError::user_message).collect();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), errors.len());
    }

    #[test]
    fn summary_rows_not_available() {
        let rows = summary_rows(&SignalSummary {
            ema_trend: EmaTrend::Bearish,
            rsi_value: None,
            macd_trend: MacdTrend::NotAvailable,
        });
        assert_eq!(rows[1].signal, SummaryValue::Text("N/A".into()));
        assert_eq!(rows[2].signal, SummaryValue::Text("N/A".into()));
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[0]["signal"], "Bearish");
    }

    #[test]
    fn summary_number_serialises_as_number() {
        let rows = summary_rows(&SignalSummary {
            ema_trend: EmaTrend::Bullish,
            rsi_value: Some(12.5),
            macd_trend: MacdTrend::Buy,
        });
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[1]["signal"], 12.5);
    }
}
