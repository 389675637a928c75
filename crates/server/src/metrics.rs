//! Prometheus metrics

use axum::extract::State;
use axum::http::StatusCode;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

/// Install the global Prometheus recorder and describe the counters.
/// Call once at startup; the returned handle renders `/metrics`.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!("nano_chat_requests_total", "Chat messages processed");
    describe_counter!(
        "nano_verification_attempts_total",
        "Identity verification attempts by outcome"
    );
    describe_counter!("nano_sessions_created_total", "Sessions created");
    describe_counter!("nano_sessions_expired_total", "Sessions expired by the cleanup sweep");

    Ok(handle)
}

pub fn record_chat_request() {
    counter!("nano_chat_requests_total").increment(1);
}

pub fn record_verification(success: bool) {
    let outcome = if success { "success" } else { "failed" };
    counter!("nano_verification_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_session_created() {
    counter!("nano_sessions_created_total").increment(1);
}

pub fn record_sessions_expired(count: usize) {
    counter!("nano_sessions_expired_total").increment(count as u64);
}

/// Render the Prometheus exposition text.
pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    match &state.metrics {
        Some(handle) => Ok(handle.render()),
        None => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}
