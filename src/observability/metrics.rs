//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (requests, latency, reloads)
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `switchman_requests_total` (counter): requests by method, status, endpoint type
//! - `switchman_request_duration_seconds` (histogram): latency distribution
//! - `switchman_config_reloads_total` (counter): reloads by result
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - Endpoint label is the behavior kind, not the location, to bound cardinality

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled request.
pub fn record_request(method: &str, status: u16, endpoint: &'static str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("endpoint", endpoint.to_string()),
    ];
    metrics::counter!("switchman_requests_total", &labels).increment(1);
    metrics::histogram!("switchman_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record a routing configuration reload attempt.
pub fn record_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("switchman_config_reloads_total", "result" => result).increment(1);
}
