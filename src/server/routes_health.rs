//! Liveness, readiness, and Prometheus endpoints.
//!
//! `/healthz` answers as long as the process serves HTTP. `/readyz` also
//! pings the database (`SELECT 1`, 2-second timeout) and flips to 503 when
//! it is unreachable, so a load balancer or kubelet stops routing traffic
//! here until connectivity returns. `/metrics` is the scrape endpoint.

use super::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

/// Liveness probe. No dependency checks: if the binary is serving HTTP,
/// it is alive.
pub async fn handler_healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Readiness probe: 200 once the database answers, 503 otherwise.
pub async fn handler_readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let check =
        tokio::time::timeout(std::time::Duration::from_secs(2), state.db.health_check()).await;

    match check {
        Ok(Ok(())) => (StatusCode::OK, "ok"),
        Ok(Err(_)) => (StatusCode::SERVICE_UNAVAILABLE, "database unreachable"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "database timeout"),
    }
}

/// Metrics in OpenMetrics text format.
///
/// Pool gauges are sampled from the live pool at scrape time; everything
/// else is updated inline by the handlers that own the counters.
pub async fn handler_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pool_size = state.db.pool().size();
    let pool_idle = state.db.pool().num_idle();
    state
        .prom_metrics
        .db_pool_active
        .set((pool_size as i64) - (pool_idle as i64));
    state.prom_metrics.db_pool_idle.set(pool_idle as i64);

    let body = state.prom_metrics.encode();
    (
        StatusCode::OK,
        [(
            "content-type",
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        body,
    )
}
