//! Hot Stocks API Server
//!
//! Serves the constituents table, universe-wide RSI screening and
//! per-symbol RSI series over HTTP.

use dotenvy::dotenv;
use hotstocks::config::{self, ScreeningConfig};
use hotstocks::core::http::start_server;
use hotstocks::core::screening::ScreeningService;
use hotstocks::logging;
use hotstocks::metrics::Metrics;
use hotstocks::services::universe::SYMBOL_COLUMN;
use hotstocks::services::{
    load_universe, CsvDirectoryProvider, PriceHistoryProvider, YahooChartProvider,
};
use std::env;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let env = config::get_environment();
    info!("Starting Hot Stocks API Server");
    info!(environment = %env, "Environment");

    let defaults = ScreeningConfig::from_env()?;
    info!(
        period = defaults.period,
        oversold = defaults.oversold,
        overbought = defaults.overbought,
        "RSI defaults: period {}, oversold < {}, overbought > {}",
        defaults.period,
        defaults.oversold,
        defaults.overbought
    );

    let universe_path = config::get_universe_path();
    let name_column = config::get_universe_name_column();
    let universe = Arc::new(load_universe(&universe_path, SYMBOL_COLUMN, &name_column)?);

    let provider: Arc<dyn PriceHistoryProvider> = match config::get_prices_dir() {
        Some(dir) => {
            info!(dir = %dir, "Price history: CSV directory {}", dir);
            Arc::new(CsvDirectoryProvider::new(dir))
        }
        None => {
            info!(base_url = %config::get_yahoo_base_url(), "Price history: Yahoo chart API");
            Arc::new(YahooChartProvider::new()?)
        }
    };

    let metrics = Arc::new(Metrics::new()?);
    let service = Arc::new(
        ScreeningService::new(universe, provider)
            .with_defaults(defaults)
            .with_metrics(metrics.clone()),
    );

    info!(port = port, "HTTP Server: http://0.0.0.0:{}", port);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, service, metrics).await {
            error!(error = %e, "HTTP server error");
        }
    });

    // Graceful shutdown
    info!("API server started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
            info!("API server stopped");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
