//! HTTP endpoint server using Axum

use axum::{
    extract::{Form, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::config::Config;
use crate::levels::{parse_level_request, LevelEngine, LevelError};
use crate::metrics::Metrics;
use crate::models::levels::{DetectionParams, LevelReport};
use crate::models::market::MarketQuery;
use crate::services::market_data::{MarketDataError, MarketDataProvider};
use crate::services::yahoo::YahooMarketDataProvider;

#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub provider: Arc<dyn MarketDataProvider + Send + Sync>,
    pub engine: LevelEngine,
    pub default_top_k: usize,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn MarketDataProvider + Send + Sync>,
        metrics: Arc<Metrics>,
        default_top_k: usize,
    ) -> Self {
        Self {
            metrics,
            start_time: Arc::new(Instant::now()),
            provider,
            engine: LevelEngine::new(),
            default_top_k,
        }
    }
}

/// Failure surfaced to API clients as `{ "error": kind, "message": text }`.
#[derive(Debug)]
pub enum ApiError {
    Level(LevelError),
    MarketData(MarketDataError),
}

impl From<LevelError> for ApiError {
    fn from(error: LevelError) -> Self {
        ApiError::Level(error)
    }
}

impl From<MarketDataError> for ApiError {
    fn from(error: MarketDataError) -> Self {
        ApiError::MarketData(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::Level(e) => {
                let status = match e {
                    LevelError::EmptyData => StatusCode::NOT_FOUND,
                    _ => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, e.kind(), e.to_string())
            }
            ApiError::MarketData(e) => (StatusCode::BAD_GATEWAY, "market_data", e.to_string()),
        };
        (status, Json(json!({ "error": kind, "message": message }))).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct LevelResponse {
    pub query: MarketQuery,
    pub params: DetectionParams,
    pub report: LevelReport,
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": "healthy",
        "uptime_seconds": uptime_seconds,
        "service": "levelscan"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis() as u64,
            "HTTP request error"
        );
    }

    response
}

/// Parse the form fields, fetch bars and run the level engine.
async fn run_detection(
    state: &AppState,
    fields: &HashMap<String, String>,
) -> Result<LevelResponse, ApiError> {
    let request = parse_level_request(fields, state.default_top_k)?;

    let bars = state.provider.get_bars(&request.query).await?;
    info!(
        symbol = %request.query.symbol,
        period = %request.query.period,
        interval = %request.query.interval,
        provider = state.provider.name(),
        bars = bars.len(),
        "Detecting support/resistance levels"
    );

    let report = state.engine.detect(&bars, &request.params)?;

    Ok(LevelResponse {
        query: request.query,
        params: request.params,
        report,
    })
}

async fn respond(state: AppState, fields: HashMap<String, String>) -> Result<Json<LevelResponse>, ApiError> {
    match run_detection(&state, &fields).await {
        Ok(response) => {
            state.metrics.level_detections_total.inc();
            Ok(Json(response))
        }
        Err(e) => {
            state.metrics.level_detection_failures_total.inc();
            warn!(error = ?e, "Level detection rejected");
            Err(e)
        }
    }
}

/// `POST /api/levels` with the form-encoded fields of the chart form
async fn detect_levels_form(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Json<LevelResponse>, ApiError> {
    respond(state, fields).await
}

/// `GET /api/levels?ticker=...` with the same fields as a query string
async fn detect_levels_query(
    State(state): State<AppState>,
    Query(fields): Query<HashMap<String, String>>,
) -> Result<Json<LevelResponse>, ApiError> {
    respond(state, fields).await
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route(
            "/api/levels",
            get(detect_levels_query).post(detect_levels_form),
        )
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let provider = Arc::new(YahooMarketDataProvider::new(
        config.yahoo_base_url.clone(),
        config.http_timeout,
    )?);

    let state = AppState::new(provider, metrics, config.top_k);
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!(port = config.port, "HTTP server listening on port {}", config.port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        config.port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
