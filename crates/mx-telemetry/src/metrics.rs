//! Prometheus metrics for message-exchange sessions.
//!
//! All collectors live in the default registry and follow the naming
//! convention `mx_<subject>_<unit>`.

use crate::TelemetryError;
use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Sessions started, by role (initiator/responder)
    pub static ref SESSIONS_STARTED: IntCounterVec = register_int_counter_vec!(
        "mx_sessions_started_total",
        "Total protocol sessions started",
        &["role"]
    )
    .expect("Failed to create SESSIONS_STARTED metric");

    /// Sessions finished, by role and terminal state
    pub static ref SESSIONS_FINISHED: IntCounterVec = register_int_counter_vec!(
        "mx_sessions_finished_total",
        "Total protocol sessions finished",
        &["role", "outcome"]
    )
    .expect("Failed to create SESSIONS_FINISHED metric");

    /// Isolated hook failures, by hook name
    pub static ref HOOK_FAILURES: IntCounterVec = register_int_counter_vec!(
        "mx_hook_failures_total",
        "Total hook failures isolated from the protocol",
        &["hook"]
    )
    .expect("Failed to create HOOK_FAILURES metric");

    /// Finality certificates issued by this process
    pub static ref FINALITY_CERTIFICATES: IntCounter = register_int_counter!(
        "mx_finality_certificates_total",
        "Total finality certificates issued"
    )
    .expect("Failed to create FINALITY_CERTIFICATES metric");
}

/// Render the default registry in Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsEncode(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsEncode(e.to_string()))
}
