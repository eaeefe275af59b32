// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics module
//!
//! Provides global metrics using the default Prometheus registry via macros and
//! an Axum-compatible metrics handler.

use std::sync::LazyLock;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use prometheus::{
    Encoder, HistogramVec, IntCounterVec, TextEncoder, register_histogram_vec,
    register_int_counter_vec,
};
use shared_types::ChainId;
use tracing::error;

/// Balance lookups received, labeled by `chain_id` and `operation`.
pub static REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "balance_gateway_requests_total",
        "Total number of balance lookups, labeled by chain_id and operation",
        &["chain_id", "operation"]
    )
    .expect("Failed to create balance_gateway_requests_total counter vec")
});

/// Failed balance lookups, labeled by `chain_id` and error `kind`.
pub static FAILURES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "balance_gateway_failures_total",
        "Total number of failed balance lookups, labeled by chain_id and kind",
        &["chain_id", "kind"]
    )
    .expect("Failed to create balance_gateway_failures_total counter vec")
});

/// End-to-end lookup durations in seconds (upstream call plus sink write).
pub static LOOKUP_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "balance_gateway_lookup_duration_seconds",
        "Balance lookup durations in seconds",
        &["operation", "result"],
        vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("Failed to create lookup duration histogram")
});

/// Count a lookup
pub fn inc_requests(chain_id: ChainId, operation: &str) {
    REQUESTS
        .with_label_values(&[chain_id.to_string().as_str(), operation])
        .inc();
}

/// Count a failed lookup
pub fn inc_failures(chain_id: ChainId, kind: &str) {
    FAILURES
        .with_label_values(&[chain_id.to_string().as_str(), kind])
        .inc();
}

/// Observe the duration of a lookup
///
/// # Arguments
/// * `operation` - Lookup operation label
/// * `result` - `success` or `failure`
/// * `duration_secs` - The duration of the lookup in seconds
pub fn observe_lookup_duration(operation: &str, result: &str, duration_secs: f64) {
    LOOKUP_DURATION
        .with_label_values(&[operation, result])
        .observe(duration_secs);
}

/// Axum handler that exports metrics in Prometheus text format
pub async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    match String::from_utf8(buffer) {
        Ok(body) => (
            [(header::CONTENT_TYPE, encoder.format_type().to_string())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "metrics buffer is not valid UTF-8");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exported_text_contains_lookup_counters() {
        inc_requests(ChainId::new(1), "native_balance");
        inc_failures(ChainId::new(1), "upstream");
        observe_lookup_duration("native_balance", "failure", 0.2);

        let response = metrics_handler().await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("balance_gateway_requests_total"));
        assert!(text.contains(r#"kind="upstream""#));
        assert!(text.contains("balance_gateway_lookup_duration_seconds_bucket"));
    }
}
