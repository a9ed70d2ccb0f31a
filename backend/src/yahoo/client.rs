// =============================================================================
// Yahoo Finance Chart API Client — public OHLC bars
// =============================================================================
//
// Only the unauthenticated chart endpoint is used:
//
//   GET /v8/finance/chart/{symbol}?range={range}&interval={interval}
//
// Missing values arrive as JSON `null` inside the quote arrays and are kept
// as `None` so the validator can decide what to do with them.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Url;
use tracing::{debug, instrument, warn};

use crate::market_data::{BarRequest, CandidateBar, CandidateSeries, MarketDataSource};

/// Default public endpoint.
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// The chart endpoint rejects requests without a browser-like user agent.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) gold-signal-dashboard";

/// Yahoo Finance chart client.
#[derive(Clone)]
pub struct YahooChartClient {
    base_url: Url,
    client: reqwest::Client,
}

impl YahooChartClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a client for `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())
            .with_context(|| format!("invalid chart base url '{}'", base_url.as_ref()))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("chart base url '{base_url}' cannot carry a path");
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %base_url, timeout_ms = timeout.as_millis() as u64, "YahooChartClient initialised");

        Ok(Self { base_url, client })
    }

    /// The symbol is encoded as one path segment and the other request values
    /// as query pairs.
    fn chart_url(&self, request: &BarRequest) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("chart base url '{}' cannot carry a path", self.base_url))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", request.symbol.as_str()]);
        url.query_pairs_mut()
            .clear()
            .append_pair("range", &request.range)
            .append_pair("interval", &request.interval);
        Ok(url)
    }

    // -------------------------------------------------------------------------
    // Public market data
    // -------------------------------------------------------------------------

    /// GET /v8/finance/chart/{symbol} and parse the bars.
    #[instrument(skip(self, request), fields(request = %request), name = "yahoo::get_chart")]
    pub async fn get_chart(&self, request: &BarRequest) -> Result<CandidateSeries> {
        let url = self.chart_url(request)?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("GET /v8/finance/chart request failed")?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse chart response")?;

        if !status.is_success() {
            anyhow::bail!("Yahoo GET /v8/finance/chart returned {}: {}", status, body);
        }

        let series = parse_chart_response(&body)?;
        debug!(count = series.len(), has_close = series.has_close, "chart bars fetched");
        Ok(series)
    }
}

#[async_trait]
impl MarketDataSource for YahooChartClient {
    async fn fetch_bars(&self, request: &BarRequest) -> Result<CandidateSeries> {
        self.get_chart(request).await
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

impl std::fmt::Debug for YahooChartClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooChartClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

// -------------------------------------------------------------------------
// Response parsing
// -------------------------------------------------------------------------

/// Convert a chart response body into a candidate series.
///
/// Expected shape:
/// ```json
/// { "chart": { "result": [ { "timestamp": [..],
///     "indicators": { "quote": [ { "open": [..], "high": [..],
///                                  "low": [..], "close": [..] } ] } } ],
///   "error": null } }
/// ```
///
/// A provider-reported `chart.error` is an error.  A missing result or
/// timestamp array is an empty series.  A missing `close` column is kept as
/// `has_close == false`.
pub fn parse_chart_response(body: &serde_json::Value) -> Result<CandidateSeries> {
    let chart = body
        .get("chart")
        .context("chart response missing 'chart' object")?;

    if let Some(err) = chart.get("error").filter(|e| !e.is_null()) {
        let code = err["code"].as_str().unwrap_or("unknown");
        let description = err["description"].as_str().unwrap_or("");
        anyhow::bail!("Yahoo chart error {code}: {description}");
    }

    let Some(result) = chart["result"].as_array().and_then(|arr| arr.first()) else {
        warn!("chart response has no result entry");
        return Ok(CandidateSeries::empty());
    };

    let Some(timestamps) = result["timestamp"].as_array() else {
        return Ok(CandidateSeries::empty());
    };

    let quote = &result["indicators"]["quote"][0];
    let open = column(quote, "open");
    let high = column(quote, "high");
    let low = column(quote, "low");
    let close = column(quote, "close");
    let has_close = close.is_some();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(timestamp) = ts.as_i64().and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
        else {
            warn!(index = i, value = %ts, "skipping bar with invalid timestamp");
            continue;
        };
        bars.push(CandidateBar {
            timestamp,
            open: value_at(open, i),
            high: value_at(high, i),
            low: value_at(low, i),
            close: value_at(close, i),
        });
    }

    Ok(CandidateSeries { has_close, bars })
}

fn column<'a>(quote: &'a serde_json::Value, name: &str) -> Option<&'a Vec<serde_json::Value>> {
    quote.get(name).and_then(serde_json::Value::as_array)
}

fn value_at(column: Option<&Vec<serde_json::Value>>, i: usize) -> Option<f64> {
    column.and_then(|c| c.get(i)).and_then(serde_json::Value::as_f64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
