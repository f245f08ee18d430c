//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bootstrap_bind_attempts_total` (counter): bind attempts by outcome
//!   (`bound`, `port_in_use`, `failed`)
//! - `bootstrap_serving` (gauge): 1 while a server is serving

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_bind_attempt(outcome: &'static str) {
    ::metrics::counter!("bootstrap_bind_attempts_total", "outcome" => outcome).increment(1);
}

pub fn set_serving(serving: bool) {
    ::metrics::gauge!("bootstrap_serving").set(if serving { 1.0 } else { 0.0 });
}
