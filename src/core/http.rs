//! Axum router for the screening API

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::config::ScreeningConfig;
use crate::core::screening::{ScreeningError, ScreeningService, SymbolReport};
use crate::export;
use crate::metrics::Metrics;
use crate::models::screening::{Classification, ScreeningResult, SymbolOutcome};
use crate::models::series::{PricePoint, PriceSeries};
use crate::services::market_data::HistoryRange;

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub service: Arc<ScreeningService>,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Error body returned as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ScreeningError> for ApiError {
    fn from(e: ScreeningError) -> Self {
        let status = match &e {
            ScreeningError::Config(_) => StatusCode::BAD_REQUEST,
            ScreeningError::UnknownSymbol(_) => StatusCode::NOT_FOUND,
            ScreeningError::Provider(_) => StatusCode::BAD_GATEWAY,
            ScreeningError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %e, "Screening request failed");
        }
        Self::new(status, e.to_string())
    }
}

impl From<export::ExportError> for ApiError {
    fn from(e: export::ExportError) -> Self {
        error!(error = %e, "CSV export failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "universe_size": state.service.universe().len(),
        "service": "hotstocks-screener"
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
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

/// Per-run overrides shared by the screening endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ScreenQuery {
    period: Option<usize>,
    oversold: Option<f64>,
    overbought: Option<f64>,
    range: Option<String>,
    #[serde(default)]
    include_series: bool,
}

impl ScreenQuery {
    fn config(&self, defaults: ScreeningConfig) -> ScreeningConfig {
        defaults.with_overrides(self.period, self.oversold, self.overbought)
    }

    fn range(&self) -> Result<HistoryRange, ApiError> {
        match self.range.as_deref() {
            None => Ok(HistoryRange::default()),
            Some(raw) => raw
                .parse()
                .map_err(|e: crate::services::ProviderError| {
                    ApiError::new(StatusCode::BAD_REQUEST, e.to_string())
                }),
        }
    }
}

#[derive(Debug, Serialize)]
struct HotStocksResponse {
    config: ScreeningConfig,
    range: HistoryRange,
    symbols_screened: usize,
    hot_set: BTreeSet<String>,
    oversold: usize,
    overbought: usize,
    neutral: usize,
    undetermined: usize,
    outcomes: Vec<SymbolOutcome>,
}

impl HotStocksResponse {
    fn new(result: ScreeningResult, range: HistoryRange, include_series: bool) -> Self {
        Self {
            config: result.config,
            range,
            symbols_screened: result.len(),
            oversold: result.count(Classification::Oversold),
            overbought: result.count(Classification::Overbought),
            neutral: result.count(Classification::Neutral),
            undetermined: result.count(Classification::Undetermined),
            hot_set: result.hot_set,
            outcomes: result
                .outcomes
                .into_values()
                .map(|mut outcome| {
                    if !include_series {
                        outcome.oscillator = None;
                    }
                    outcome
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScreenRequest {
    #[serde(default)]
    config: Option<ScreeningConfig>,
    series: HashMap<String, Vec<PricePoint>>,
}

async fn list_universe(State(state): State<AppState>) -> Json<Value> {
    let universe = state.service.universe();
    let symbols: Vec<Value> = universe
        .iter()
        .map(|(symbol, name)| json!({ "symbol": symbol, "name": name }))
        .collect();
    Json(json!({
        "count": universe.len(),
        "symbols": symbols
    }))
}

async fn universe_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mut buffer = Vec::new();
    export::write_universe_csv(state.service.universe(), &mut buffer)?;
    Ok(csv_attachment("universe.csv", buffer))
}

/// Screen the whole universe
async fn hot_stocks(
    State(state): State<AppState>,
    Query(query): Query<ScreenQuery>,
) -> Result<Json<HotStocksResponse>, ApiError> {
    let range = query.range()?;
    let config = query.config(state.service.defaults());
    let result = state.service.run(config, range).await?;

    info!(
        hot = result.hot_set.len(),
        screened = result.len(),
        "Hot stocks: {} of {} symbols",
        result.hot_set.len(),
        result.len()
    );
    Ok(Json(HotStocksResponse::new(
        result,
        range,
        query.include_series,
    )))
}

async fn hot_stocks_csv(
    State(state): State<AppState>,
    Query(query): Query<ScreenQuery>,
) -> Result<Response, ApiError> {
    let range = query.range()?;
    let config = query.config(state.service.defaults());
    let result = state.service.run(config, range).await?;

    let mut buffer = Vec::new();
    export::write_screening_csv(&result, &mut buffer)?;
    Ok(csv_attachment("hot_stocks.csv", buffer))
}

/// RSI development of one symbol
async fn symbol_rsi(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<ScreenQuery>,
) -> Result<Json<SymbolReport>, ApiError> {
    let range = query.range()?;
    let config = query.config(state.service.defaults());
    let report = state.service.symbol_report(&symbol, config, range).await?;
    Ok(Json(report))
}

/// Screen histories supplied in the request body
async fn screen_supplied(
    State(state): State<AppState>,
    Json(request): Json<ScreenRequest>,
) -> Result<Json<ScreeningResult>, ApiError> {
    let config = request.config.unwrap_or_else(|| state.service.defaults());

    let mut prices = HashMap::with_capacity(request.series.len());
    for (symbol, points) in request.series {
        let series = PriceSeries::new(symbol.clone(), points)
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
        prices.insert(symbol, series);
    }

    let result = state.service.screen_prices(config, prices).await?;
    Ok(Json(result))
}

fn csv_attachment(filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/universe", get(list_universe))
        .route("/api/universe.csv", get(universe_csv))
        .route("/api/hot-stocks", get(hot_stocks))
        .route("/api/hot-stocks.csv", get(hot_stocks_csv))
        .route("/api/symbols/{symbol}/rsi", get(symbol_rsi))
        .route("/api/screen", post(screen_supplied))
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

pub async fn start_server(
    port: u16,
    service: Arc<ScreeningService>,
    metrics: Arc<Metrics>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = AppState {
        health: Arc::new(RwLock::new(HealthStatus::default())),
        metrics,
        start_time: Arc::new(Instant::now()),
        service,
    };
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
