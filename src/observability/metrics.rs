//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mux_requests_total` (counter): dispatched requests by method, outcome
//! - `mux_dispatch_duration_seconds` (histogram): dispatch latency by outcome
//! - `mux_routes_registered_total` (counter): registrations, created vs updated
//!
//! # Design Decisions
//! - Recording without an installed recorder is a no-op
//! - Prometheus exporter is opt-in from config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Terminal state of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Served,
    NotFound,
    Fault,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Served => "served",
            Outcome::NotFound => "not_found",
            Outcome::Fault => "fault",
        }
    }
}

/// Install the Prometheus exporter with an HTTP scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_dispatch(method: &str, outcome: Outcome, start: Instant) {
    ::metrics::counter!(
        "mux_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    ::metrics::histogram!("mux_dispatch_duration_seconds", "outcome" => outcome.as_str())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_route_registered(created: bool) {
    let kind = if created { "created" } else { "updated" };
    ::metrics::counter!("mux_routes_registered_total", "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Served.as_str(), "served");
        assert_eq!(Outcome::NotFound.as_str(), "not_found");
        assert_eq!(Outcome::Fault.as_str(), "fault");
    }

    #[test]
    fn test_recording_without_recorder() {
        record_dispatch("GET", Outcome::Served, Instant::now());
        record_route_registered(true);
    }
}
