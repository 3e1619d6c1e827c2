// Activity Monitor - HTTP surface
// Slider form page + JSON/text analysis API with Axum

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::MonitorConfig;
use crate::detectors::LocationAnomaly;
use crate::models::Transaction;
use crate::monitor::{render_failure, AnalysisParams, AnalysisReport, Monitor};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<Monitor>,
    pub config: Arc<MonitorConfig>,
}

impl AppState {
    pub fn new(monitor: Monitor, config: MonitorConfig) -> Self {
        AppState {
            monitor: Arc::new(monitor),
            config: Arc::new(config),
        }
    }
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Query string of the analysis endpoints; omitted values use config defaults
#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    pub threshold_km: Option<f64>,
    pub spending_limit: Option<f64>,
}

/// Analysis response
#[derive(Serialize)]
pub struct AnalysisResponse {
    pub report: String,
    pub threshold_km: f64,
    pub spending_limit: f64,
    pub unusual_location_count: usize,
    pub suspicious_transaction_count: usize,
    pub unusual_locations: Vec<LocationAnomaly>,
    pub suspicious_transactions: Vec<Transaction>,
}

impl From<AnalysisReport> for AnalysisResponse {
    fn from(report: AnalysisReport) -> Self {
        Self {
            report: report.render(),
            threshold_km: report.params.threshold_km,
            spending_limit: report.params.spending_limit,
            unusual_location_count: report.unusual_locations.len(),
            suspicious_transaction_count: report.suspicious_transactions.len(),
            unusual_locations: report.unusual_locations,
            suspicious_transactions: report.suspicious_transactions,
        }
    }
}

fn resolve_params(config: &MonitorConfig, query: &AnalyzeQuery) -> Result<AnalysisParams, String> {
    let params = AnalysisParams::new(
        query.threshold_km.unwrap_or(config.default_threshold_km),
        query.spending_limit.unwrap_or(config.default_spending_limit),
    );
    config
        .check_params(&params)
        .map(|_| params)
        .map_err(|e| e.to_string())
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/analyze - Structured analysis
async fn analyze(State(state): State<AppState>, Query(query): Query<AnalyzeQuery>) -> Response {
    let params = match resolve_params(&state.config, &query) {
        Ok(params) => params,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<AnalysisResponse>::err(message)),
            )
                .into_response()
        }
    };

    match state.monitor.analyze(params) {
        Ok(report) => {
            let response: AnalysisResponse = report.into();
            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => {
            log::error!("Error running analysis: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<AnalysisResponse>::err(render_failure(&e))),
            )
                .into_response()
        }
    }
}

/// GET /api/report - Plain-text report, same text the form shows
async fn report(State(state): State<AppState>, Query(query): Query<AnalyzeQuery>) -> Response {
    let text = match resolve_params(&state.config, &query) {
        Ok(params) => state
            .monitor
            .run_analysis(params.threshold_km, params.spending_limit),
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    )
        .into_response()
}

/// GET /api/config - Slider ranges and defaults for the form
async fn form_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(FormConfig::from(state.config.as_ref())))
}

#[derive(Serialize)]
struct FormConfig {
    title: &'static str,
    description: &'static str,
    threshold_km: Slider,
    spending_limit: Slider,
}

#[derive(Serialize)]
struct Slider {
    label: &'static str,
    min: f64,
    max: f64,
    step: f64,
    value: f64,
}

impl From<&MonitorConfig> for FormConfig {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            title: crate::APP_TITLE,
            description: crate::APP_DESCRIPTION,
            threshold_km: Slider {
                label: "Threshold Distance (km)",
                min: config.threshold_range.min,
                max: config.threshold_range.max,
                step: config.threshold_range.step,
                value: config.default_threshold_km,
            },
            spending_limit: Slider {
                label: "Spending Limit (USD)",
                min: config.spending_range.min,
                max: config.spending_range.max,
                step: config.spending_range.step,
                value: config.default_spending_limit,
            },
        }
    }
}

/// GET / - Serve the slider form
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/config", get(form_config))
        .route("/analyze", get(analyze))
        .route("/report", get(report))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{ActivitySource, SampleSource};
    use crate::models::{HomeCoordinate, LocationPoint};
    use anyhow::anyhow;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    struct UnreachableSource;

    impl ActivitySource for UnreachableSource {
        fn load_locations(&self) -> anyhow::Result<Vec<LocationPoint>> {
            Err(anyhow!("location store unreachable"))
        }

        fn load_transactions(&self) -> anyhow::Result<Vec<Transaction>> {
            Ok(Vec::new())
        }

        fn describe(&self) -> String {
            "unreachable".to_string()
        }
    }

    fn app() -> Router {
        let monitor = Monitor::new(Box::new(SampleSource), HomeCoordinate::default());
        router(AppState::new(monitor, MonitorConfig::default()))
    }

    async fn get_body(uri: &str) -> (StatusCode, String) {
        send(app(), uri).await
    }

    async fn send(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_body("/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"success":true,"data":"OK"}"#);
    }

    #[tokio::test]
    async fn test_analyze_json() {
        let (status, body) = get_body("/api/analyze?threshold_km=20&spending_limit=500").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["unusual_location_count"], 1);
        assert_eq!(json["data"]["suspicious_transaction_count"], 1);
        assert_eq!(json["data"]["suspicious_transactions"][0]["merchant"], "Store B");
    }

    #[tokio::test]
    async fn test_analyze_defaults() {
        let (status, body) = get_body("/api/analyze").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["data"]["threshold_km"], 20.0);
        assert_eq!(json["data"]["spending_limit"], 500.0);
    }

    #[tokio::test]
    async fn test_analyze_out_of_range() {
        let (status, body) = get_body("/api/analyze?threshold_km=250").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("threshold_km"));
    }

    #[tokio::test]
    async fn test_analyze_source_failure() {
        let monitor = Monitor::new(Box::new(UnreachableSource), HomeCoordinate::default());
        let app = router(AppState::new(monitor, MonitorConfig::default()));

        let (status, body) = send(app, "/api/analyze?threshold_km=20&spending_limit=500").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], false);
        let error = json["error"].as_str().unwrap();
        assert!(error.starts_with("An error occurred:"), "got: {}", error);
        assert!(error.contains("location store unreachable"));
    }

    #[tokio::test]
    async fn test_report_text() {
        let (status, body) = get_body("/api/report?threshold_km=100&spending_limit=1000").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "No unusual activities detected.");
    }

    #[tokio::test]
    async fn test_index_page() {
        let (status, body) = get_body("/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/api/report"));
    }
}
