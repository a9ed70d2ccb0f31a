// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  Every dashboard request is one
// pipeline run against freshly fetched bars.
//
// CORS is configured permissively so a browser renderer on another origin can
// call the API; tighten it in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::dashboard::{self, DashboardError, Severity};
use crate::pipeline::PipelineError;
use crate::runtime_config::{PipelineConfig, RuntimeConfig};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/dashboard", get(dashboard_report))
        .route("/api/v1/config", get(get_config))
        .route("/api/v1/config/pipeline", post(set_pipeline_config))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
    uptime_secs: i64,
    provider: String,
    runs_total: u64,
    runs_failed: u64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let resp = HealthResponse {
        status: "ok",
        server_time: now.timestamp_millis(),
        uptime_secs: (now - state.started_at).num_seconds(),
        provider: state.source.name().to_string(),
        runs_total: state.runs_total(),
        runs_failed: state.runs_failed(),
    };
    Json(resp)
}

// =============================================================================
// Dashboard
// =============================================================================

/// Per-request overrides of the configured bar request.
#[derive(Debug, Default, Deserialize)]
struct DashboardQuery {
    symbol: Option<String>,
    range: Option<String>,
    interval: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    kind: &'static str,
    severity: Severity,
    message: String,
    detail: String,
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Fetch(_) => StatusCode::BAD_GATEWAY,
            Self::Pipeline(PipelineError::InsufficientHistory { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Pipeline(PipelineError::ComputationError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Pipeline(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = ErrorBody {
            kind: self.kind(),
            severity: self.severity(),
            message: self.user_message(),
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn dashboard_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, DashboardError> {
    let config = state.config();

    let mut request = config.source.bar_request();
    if let Some(symbol) = query.symbol.filter(|s| !s.trim().is_empty()) {
        request.symbol = symbol.trim().to_uppercase();
    }
    if let Some(range) = query.range.filter(|s| !s.trim().is_empty()) {
        request.range = range.trim().to_string();
    }
    if let Some(interval) = query.interval.filter(|s| !s.trim().is_empty()) {
        request.interval = interval.trim().to_string();
    }

    let result =
        dashboard::build_report(state.source.as_ref(), request, config.page, &config.pipeline)
            .await;
    state.record_run(result.is_ok());

    Ok(Json(result?))
}

// =============================================================================
// Configuration
// =============================================================================

async fn get_config(State(state): State<Arc<AppState>>) -> Json<RuntimeConfig> {
    Json(state.config())
}

async fn set_pipeline_config(
    State(state): State<Arc<AppState>>,
    Json(pipeline): Json<PipelineConfig>,
) -> Response {
    if let Err(e) = pipeline.validate() {
        warn!(error = %e, "rejected pipeline config update");
        let body = serde_json::json!({ "error": e.to_string() });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    state.runtime_config.write().pipeline = pipeline;
    info!(
        convention = %pipeline.ewma_convention,
        min_history = pipeline.min_history,
        ema_spans = ?pipeline.ema_spans,
        rsi_period = pipeline.rsi_period,
        "pipeline config updated"
    );
    Json(pipeline).into_response()
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::{rising_source, StaticSource};
    use crate::market_data::bar::tests::candidate_from_closes;
    use crate::market_data::CandidateSeries;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app_with(source: StaticSource) -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::new(RuntimeConfig::default(), Arc::new(source)));
        (router(state.clone()), state)
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_ok() {
        let (app, _) = app_with(rising_source(60));
        let (status, body) = send(app, get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["provider"], "static");
    }

    #[tokio::test]
    async fn dashboard_returns_report() {
        let (app, state) = app_with(rising_source(60));
        let (status, body) = send(app, get("/api/v1/dashboard")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"]["title"], "Gold (XAU/USD) Dashboard");
        assert_eq!(body["request"]["symbol"], "GC=F");
        assert_eq!(body["chart"]["close"].as_array().unwrap().len(), 60);
        assert_eq!(body["summary"][0]["indicator"], "EMA Trend");
        assert_eq!(body["summary"][0]["signal"], "Bullish");
        assert_eq!(body["summary"][2]["signal"], "Buy");
        assert_eq!(state.runs_total(), 1);
        assert_eq!(state.runs_failed(), 0);
    }

    #[tokio::test]
    async fn dashboard_query_overrides_request() {
        let (app, _) = app_with(rising_source(60));
        let (status, body) =
            send(app, get("/api/v1/dashboard?symbol=si%3Df&range=5d&interval=5m")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["request"]["symbol"], "SI=F");
        assert_eq!(body["request"]["range"], "5d");
        assert_eq!(body["request"]["interval"], "5m");
    }

    #[tokio::test]
    async fn dashboard_empty_series_is_unavailable() {
        let (app, state) = app_with(StaticSource {
            response: Ok(CandidateSeries::empty()),
        });
        let (status, body) = send(app, get("/api/v1/dashboard")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["kind"], "empty_series");
        assert_eq!(body["severity"], "error");
        assert_eq!(state.runs_failed(), 1);
    }

    #[tokio::test]
    async fn dashboard_short_history_is_warning() {
        let (app, _) = app_with(rising_source(10));
        let (status, body) = send(app, get("/api/v1/dashboard")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "insufficient_history");
        assert_eq!(body["severity"], "warning");
        assert_eq!(body["message"], "Not enough historical data to compute indicators.");
    }

    #[tokio::test]
    async fn dashboard_fetch_error_is_bad_gateway() {
        let (app, _) = app_with(StaticSource {
            response: Err("timed out".into()),
        });
        let (status, body) = send(app, get("/api/v1/dashboard")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["kind"], "fetch_failed");
    }

    async fn dashboard_error(candidate: CandidateSeries) -> (StatusCode, serde_json::Value) {
        let (app, state) = app_with(StaticSource {
            response: Ok(candidate),
        });
        let out = send(app, get("/api/v1/dashboard")).await;
        assert_eq!(state.runs_failed(), 1);
        out
    }

    #[tokio::test]
    async fn dashboard_missing_close_column_is_unavailable() {
        let mut candidate = candidate_from_closes(&[None; 60]);
        candidate.has_close = false;
        let (status, body) = dashboard_error(candidate).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["kind"], "missing_field");
        assert_eq!(body["severity"], "error");
    }

    #[tokio::test]
    async fn dashboard_all_closes_missing_is_unavailable() {
        let (status, body) = dashboard_error(candidate_from_closes(&[None; 60])).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["kind"], "all_values_missing");
        assert_eq!(body["severity"], "error");
    }

    #[tokio::test]
    async fn dashboard_zero_close_is_internal_error() {
        let mut closes: Vec<Option<f64>> = (0..60).map(|i| Some(2_300.0 + i as f64)).collect();
        closes[30] = Some(0.0);
        let (status, body) = dashboard_error(candidate_from_closes(&closes)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "computation_error");
        assert_eq!(body["severity"], "error");
        assert!(body["detail"].as_str().unwrap().contains("zero"));
    }

    #[tokio::test]
    async fn pipeline_config_update_applies() {
        let (app, state) = app_with(rising_source(10));
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/config/pipeline")
            .header("content-type", "application/json")
            .body(Body::from(r#"{ "min_history": 5, "ewma_convention": "adjusted" }"#))
            .unwrap();
        let (status, body) = send(app.clone(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["min_history"], 5);
        assert_eq!(state.config().pipeline.min_history, 5);

        // Ten bars now clear the minimum.
        let (status, _) = send(app, get("/api/v1/dashboard")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn pipeline_config_rejects_invalid() {
        let (app, state) = app_with(rising_source(60));
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/config/pipeline")
            .header("content-type", "application/json")
            .body(Body::from(r#"{ "macd_spans": { "fast": 30, "slow": 26 } }"#))
            .unwrap();
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("fast"));
        assert_eq!(state.config().pipeline, PipelineConfig::default());
    }

    #[tokio::test]
    async fn config_endpoint_returns_current() {
        let (app, _) = app_with(rising_source(60));
        let (status, body) = send(app, get("/api/v1/config")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"]["symbol"], "GC=F");
        assert_eq!(body["pipeline"]["ewma_convention"], "unadjusted");
    }
}
