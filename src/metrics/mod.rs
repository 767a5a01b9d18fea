//! Prometheus metrics for the HTTP surface and screening runs

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder,
};

use crate::models::screening::{Classification, ScreeningResult};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    pub screening_runs_total: IntCounter,
    pub screening_duration_seconds: Histogram,
    pub symbols_screened_total: IntCounter,
    pub symbols_undetermined_total: IntCounter,
    pub hot_symbols: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total number of HTTP requests")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight = IntGauge::new(
            "http_requests_in_flight",
            "Number of HTTP requests currently being served",
        )?;
        let screening_runs_total =
            IntCounter::new("screening_runs_total", "Number of completed screening runs")?;
        let screening_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "screening_duration_seconds",
                "Wall time of a screening run including price retrieval",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        )?;
        let symbols_screened_total =
            IntCounter::new("symbols_screened_total", "Symbols processed by the screener")?;
        let symbols_undetermined_total = IntCounter::new(
            "symbols_undetermined_total",
            "Symbols that could not be classified",
        )?;
        let hot_symbols = Gauge::new("hot_symbols", "Size of the latest hot set")?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(screening_runs_total.clone()))?;
        registry.register(Box::new(screening_duration_seconds.clone()))?;
        registry.register(Box::new(symbols_screened_total.clone()))?;
        registry.register(Box::new(symbols_undetermined_total.clone()))?;
        registry.register(Box::new(hot_symbols.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            screening_runs_total,
            screening_duration_seconds,
            symbols_screened_total,
            symbols_undetermined_total,
            hot_symbols,
        })
    }

    pub fn record_screening(&self, result: &ScreeningResult, elapsed_seconds: f64) {
        self.screening_runs_total.inc();
        self.screening_duration_seconds.observe(elapsed_seconds);
        self.symbols_screened_total.inc_by(result.len() as u64);
        self.symbols_undetermined_total
            .inc_by(result.count(Classification::Undetermined) as u64);
        self.hot_symbols.set(result.hot_set.len() as f64);
    }

    /// Text exposition format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
