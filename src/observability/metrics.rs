//! Metrics collection and exposition.
//!
//! # Metrics
//! - `guard_requests_total` (counter): admitted/rejected requests by channel
//! - `guard_rejections_total` (counter): rejections by reason
//! - `guard_audit_events_total` (counter): audit records by category
//! - `guard_protected_index_decisions_total` (counter): allow/deny/filter
//! - `guard_inflight_requests` (gauge): pipelines currently running
//! - `guard_open_cursors` (gauge): scroll cursors with an ownership record

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics recorder"),
    }
}

pub fn record_request(channel: &'static str, outcome: &'static str) {
    counter!("guard_requests_total", "channel" => channel, "outcome" => outcome).increment(1);
}

pub fn record_rejection(reason: &'static str) {
    counter!("guard_rejections_total", "reason" => reason).increment(1);
}

pub fn record_audit_event(category: &'static str) {
    counter!("guard_audit_events_total", "category" => category).increment(1);
}

pub fn record_index_decision(decision: &'static str) {
    counter!("guard_protected_index_decisions_total", "decision" => decision).increment(1);
}

pub fn set_inflight(count: usize) {
    gauge!("guard_inflight_requests").set(count as f64);
}

pub fn set_open_cursors(count: usize) {
    gauge!("guard_open_cursors").set(count as f64);
}
