//! Prometheus metrics endpoint.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// GET /metrics — renders the commit counters and latency histogram.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, PROMETHEUS_TEXT)],
        handle.render(),
    )
}

/// Registers descriptions for the metrics the commit pipeline emits.
pub fn describe() {
    metrics::describe_counter!("sale_commits_total", "Sale commits attempted");
    metrics::describe_counter!("sale_commits_completed", "Sale commits fully applied");
    metrics::describe_counter!("sale_commits_failed", "Sale commits that failed, by reason");
    metrics::describe_counter!(
        "sale_compensations_total",
        "Failed commits whose applied writes were reversed"
    );
    metrics::describe_counter!(
        "sale_compensation_failures_total",
        "Compensating writes that could not be applied, by action"
    );
    metrics::describe_counter!(
        "stock_conflict_retries_total",
        "Conditional updates retried after a version conflict, by collection"
    );
    metrics::describe_histogram!(
        "sale_commit_duration_seconds",
        metrics::Unit::Seconds,
        "Time spent committing a sale"
    );
}
