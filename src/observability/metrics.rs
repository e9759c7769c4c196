//! Metrics collection and exposition.
//!
//! # Metrics
//! - `introspection_requests_total` (counter): requests by method, status
//! - `introspection_request_duration_seconds` (histogram): handling latency
//! - `introspection_snapshot_failures_total` (counter): 500s by path
//! - `introspection_serve_failures_total` (counter): listener restarts
//!
//! # Design Decisions
//! - The recorder is process-global; the handle that renders it is passed
//!   to the route table explicitly
//! - Without an installed recorder every call here is a no-op

use std::time::Instant;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder globally and return its render handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe();
    Ok(handle)
}

fn describe() {
    metrics::describe_counter!(
        "introspection_requests_total",
        "Requests handled by the introspection endpoint"
    );
    metrics::describe_histogram!(
        "introspection_request_duration_seconds",
        metrics::Unit::Seconds,
        "Time spent handling introspection requests"
    );
    metrics::describe_counter!(
        "introspection_snapshot_failures_total",
        "Snapshots that could not be rendered"
    );
    metrics::describe_counter!(
        "introspection_serve_failures_total",
        "Times the introspection listener stopped serving"
    );
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "introspection_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("introspection_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a snapshot that failed to render.
pub fn record_snapshot_failure(path: &str) {
    counter!("introspection_snapshot_failures_total", "path" => path.to_string()).increment(1);
}

/// Record the listener stopping.
pub fn record_serve_failure() {
    counter!("introspection_serve_failures_total").increment(1);
}
