//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_requests_total` (counter): requests by status and protocol
//! - `bridge_request_duration_seconds` (histogram): latency distribution
//! - `bridge_warmup_modules_total` (counter): modules reported to the host
//! - `bridge_active_connections` (gauge): current connection count
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Labels limited to status code and protocol

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one served request.
pub fn record_request(protocol: &str, status: u16, start: Instant) {
    counter!(
        "bridge_requests_total",
        "status" => status.to_string(),
        "protocol" => protocol.to_string()
    )
    .increment(1);
    histogram!(
        "bridge_request_duration_seconds",
        "status" => status.to_string(),
        "protocol" => protocol.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the size of one warmup batch.
pub fn record_warmup(modules: usize) {
    counter!("bridge_warmup_modules_total").increment(modules as u64);
}

pub fn set_active_connections(count: usize) {
    gauge!("bridge_active_connections").set(count as f64);
}
