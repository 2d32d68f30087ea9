//! Prometheus metrics for the dashboard client.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which is a programming error and only surfaces
//! during static initialization.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, register_histogram_vec,
    CounterVec, Encoder, Gauge, GaugeVec, HistogramVec, TextEncoder,
};

/// Total requests by category and outcome (ok/timeout/http/network/...).
pub static REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "satvis_requests_total",
        "Total backend requests",
        &["category", "outcome"]
    )
    .unwrap()
});

/// Request latency in milliseconds.
pub static REQUEST_DURATION_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "satvis_request_duration_ms",
        "Backend request latency in milliseconds",
        &["category"],
        vec![5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]
    )
    .unwrap()
});

/// Refresh cycles by trigger (tick/manual) and outcome (updated/failed/discarded).
pub static REFRESH_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "satvis_refresh_total",
        "Total refresh cycles",
        &["trigger", "outcome"]
    )
    .unwrap()
});

/// Endpoint health from the last health check (1 = healthy).
pub static ENDPOINT_HEALTHY: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "satvis_endpoint_healthy",
        "Endpoint health from the last check (1=healthy)",
        &["category"]
    )
    .unwrap()
});

/// Unix timestamp (seconds) of the last cache swap.
pub static LAST_REFRESH_TIMESTAMP: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "satvis_last_refresh_timestamp",
        "Unix timestamp of the last successful cache swap"
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record a finished request.
    pub fn request(category: &str, outcome: &str, duration_ms: f64) {
        REQUESTS_TOTAL
            .with_label_values(&[category, outcome])
            .inc();
        REQUEST_DURATION_MS
            .with_label_values(&[category])
            .observe(duration_ms);
    }

    /// Record a refresh cycle.
    pub fn refresh(trigger: &str, outcome: &str) {
        REFRESH_TOTAL.with_label_values(&[trigger, outcome]).inc();
    }

    /// Record a cache swap.
    pub fn cache_swapped(unix_secs: i64) {
        LAST_REFRESH_TIMESTAMP.set(unix_secs as f64);
    }

    /// Record endpoint health.
    pub fn endpoint_health(category: &str, healthy: bool) {
        ENDPOINT_HEALTHY
            .with_label_values(&[category])
            .set(if healthy { 1.0 } else { 0.0 });
    }

    /// Render all registered metrics in the text exposition format.
    pub fn render() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let families = prometheus::gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&families, &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
