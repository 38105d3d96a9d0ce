//! Prometheus metrics for the floor API
//!
//! Registered once in the default registry and scraped at `GET /metrics`.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Registered on first use; an `Err` here disables recording.
pub static METRICS: Lazy<ApiResult<FloorMetrics>> = Lazy::new(FloorMetrics::new);

/// Container for all sales floor metrics.
#[derive(Clone)]
pub struct FloorMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Cache lookups - labels: cache (leaderboard/quote), outcome (hit/miss/stale)
    pub cache_lookups_total: CounterVec,

    /// Quote upstream calls - labels: status (ok/error/bad_status/malformed)
    pub upstream_requests_total: CounterVec,
}

impl FloorMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "salesfloor_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(registration_failed("http_requests_total"))?,

            http_request_duration_seconds: register_histogram_vec!(
                "salesfloor_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(registration_failed("http_request_duration_seconds"))?,

            cache_lookups_total: register_counter_vec!(
                "salesfloor_cache_lookups_total",
                "Single-slot cache lookups by outcome",
                &["cache", "outcome"]
            )
            .map_err(registration_failed("cache_lookups_total"))?,

            upstream_requests_total: register_counter_vec!(
                "salesfloor_quote_upstream_requests_total",
                "Quote upstream requests by result",
                &["status"]
            )
            .map_err(registration_failed("upstream_requests_total"))?,
        })
    }

    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }
}

fn registration_failed(name: &'static str) -> impl Fn(prometheus::Error) -> ApiError {
    move |e| ApiError::internal_error(format!("Failed to register {}: {}", name, e))
}

/// Count a cache lookup. No-op when the registry failed to initialize.
pub fn record_cache_lookup(cache: &str, outcome: &str) {
    if let Ok(metrics) = METRICS.as_ref() {
        metrics
            .cache_lookups_total
            .with_label_values(&[cache, outcome])
            .inc();
    }
}

/// Count a quote upstream call.
pub fn record_upstream_request(status: &str) {
    if let Ok(metrics) = METRICS.as_ref() {
        metrics
            .upstream_requests_total
            .with_label_values(&[status])
            .inc();
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    if let Err(e) = METRICS.as_ref() {
        tracing::error!(error = %e.message, "Metrics registry unavailable");
    }

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
