//! Test utilities for API server integration tests

use axum_test::TestServer;
use chrono::{Days, NaiveDate};
use hotstocks::core::http::{create_router, AppState, HealthStatus};
use hotstocks::core::screening::ScreeningService;
use hotstocks::metrics::Metrics;
use hotstocks::models::{PriceSeries, Universe};
use hotstocks::services::InMemoryPriceProvider;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

pub fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date");
    PriceSeries::from_pairs(
        symbol,
        closes.iter().enumerate().map(|(i, &c)| {
            let date = start
                .checked_add_days(Days::new(i as u64))
                .expect("date in range");
            (date, c)
        }),
    )
    .expect("valid series")
}

/// RISE and FALL are hot, ALT is neutral, SHORT lacks history and GHOST
/// has none at all.
pub fn fixture() -> (Universe, InMemoryPriceProvider) {
    let universe: Universe = [
        ("RISE", "Rising Corp"),
        ("FALL", "Falling Corp"),
        ("ALT", "Alternating Corp"),
        ("SHORT", "Short History Corp"),
        ("GHOST", "Ghost Corp"),
    ]
    .iter()
    .map(|(s, n)| (s.to_string(), n.to_string()))
    .collect();

    let rising: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let falling: Vec<f64> = (0..30).map(|i| 200.0 - i as f64).collect();
    let alternating: Vec<f64> = (0..30).map(|i| 100.0 + (i % 2) as f64).collect();

    let provider = InMemoryPriceProvider::new()
        .with_series(series("RISE", &rising))
        .with_series(series("FALL", &falling))
        .with_series(series("ALT", &alternating))
        .with_series(series("SHORT", &[10.0, 11.0, 12.0]));

    (universe, provider)
}

/// Test helper for API server integration tests
#[allow(dead_code)]
pub struct TestApiServer {
    pub server: TestServer,
    pub metrics: Arc<Metrics>,
}

impl TestApiServer {
    pub async fn new() -> Self {
        let (universe, provider) = fixture();
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let service = ScreeningService::new(Arc::new(universe), Arc::new(provider))
            .with_metrics(metrics.clone());

        let state = AppState {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics: metrics.clone(),
            start_time: Arc::new(Instant::now()),
            service: Arc::new(service),
        };

        let app = create_router(state);
        let server = TestServer::new(app).expect("start test server");

        Self { server, metrics }
    }
}
