//! Metrics collection and exposition.
//!
//! # Metrics
//! - `binder_routes_bound_total` (counter): routes created, by binder
//! - `binder_handler_failures_total` (counter): failed requests, by route
//! - `binder_requests_total` (counter): requests by method, status, route
//! - `binder_request_duration_seconds` (histogram): dispatch latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics recorder"),
    }
}

pub fn record_route_bound(binder: &'static str) {
    metrics::counter!("binder_routes_bound_total", "binder" => binder).increment(1);
}

pub fn record_handler_failure(route: &str) {
    metrics::counter!("binder_handler_failures_total", "route" => route.to_string()).increment(1);
}

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("route", route.to_string()),
    ];
    metrics::counter!("binder_requests_total", &labels).increment(1);
    metrics::histogram!("binder_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}
