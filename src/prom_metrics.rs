//! # Prometheus Metrics — Game Server Telemetry
//!
//! Exposes mysterd operational metrics in the Prometheus text exposition
//! format for Prometheus, Grafana Agent, or any OpenMetrics-compatible
//! collector.
//!
//! ## Metrics Exposed
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `mysterd_http_request_duration_seconds` | Histogram | `method`, `path` | HTTP request latency |
//! | `mysterd_guesses_total` | Counter | `outcome` | Guesses recorded by outcome |
//! | `mysterd_solves_total` | Counter | — | Daily numbers solved |
//! | `mysterd_signups_total` | Counter | — | Accounts registered |
//! | `mysterd_logins_total` | Counter | — | Successful logins |
//! | `mysterd_db_pool_active` | Gauge | — | Connections checked out of the pool |
//! | `mysterd_db_pool_idle` | Gauge | — | Idle pool connections |
//!
//! ## Integration
//!
//! Request latency is observed by the timing middleware; game and auth
//! handlers bump their counters inline. The `/metrics` endpoint renders the
//! current registry state on each scrape, refreshing the pool gauges first.
//!
//! ## References
//!
//! - [OpenMetrics specification](https://openmetrics.io/)
//! - [Prometheus exposition format](https://prometheus.io/docs/instrumenting/exposition_formats/)

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

/// Label set for HTTP request metrics (method plus normalized path).
#[derive(Clone, Debug, Hash, PartialEq, Eq, prometheus_client::encoding::EncodeLabelSet)]
pub struct HttpLabel {
    pub method: String,
    pub path: String,
}

/// Label set for guess outcome counters.
#[derive(Clone, Debug, Hash, PartialEq, Eq, prometheus_client::encoding::EncodeLabelSet)]
pub struct OutcomeLabel {
    pub outcome: String,
}

/// Thread-safe metrics registry for the mysterd server.
///
/// Every field is backed by atomics, so handlers and middleware update them
/// without locking. `Family` creates per-label-set instances on first use.
pub struct Metrics {
    pub registry: Registry,
    pub http_request_duration: Family<HttpLabel, Histogram>,
    pub guesses: Family<OutcomeLabel, Counter>,
    pub solves: Counter,
    pub signups: Counter,
    pub logins: Counter,
    pub db_pool_active: Gauge,
    pub db_pool_idle: Gauge,
}

impl Metrics {
    /// Create a new metrics registry with all mysterd metrics registered.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let http_request_duration = Family::<HttpLabel, Histogram>::new_with_constructor(|| {
            Histogram::new(exponential_buckets(0.001, 2.0, 14))
        });
        registry.register(
            "mysterd_http_request_duration_seconds",
            "HTTP request latency by method and path",
            http_request_duration.clone(),
        );

        let guesses = Family::<OutcomeLabel, Counter>::default();
        registry.register(
            "mysterd_guesses",
            "Guesses recorded by outcome",
            guesses.clone(),
        );

        let solves = Counter::default();
        registry.register("mysterd_solves", "Daily numbers solved", solves.clone());

        let signups = Counter::default();
        registry.register("mysterd_signups", "Accounts registered", signups.clone());

        let logins = Counter::default();
        registry.register("mysterd_logins", "Successful logins", logins.clone());

        let db_pool_active = Gauge::default();
        registry.register(
            "mysterd_db_pool_active",
            "Connections checked out of the pool",
            db_pool_active.clone(),
        );

        let db_pool_idle = Gauge::default();
        registry.register(
            "mysterd_db_pool_idle",
            "Idle connections in the pool",
            db_pool_idle.clone(),
        );

        Self {
            registry,
            http_request_duration,
            guesses,
            solves,
            signups,
            logins,
            db_pool_active,
            db_pool_idle,
        }
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn encode(&self) -> String {
        let mut buf = String::new();
        encode(&mut buf, &self.registry).expect("encoding metrics should not fail");
        buf
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_encode_returns_valid_text() {
        let m = Metrics::new();
        m.db_pool_active.set(3);
        m.solves.inc();
        m.guesses
            .get_or_create(&OutcomeLabel {
                outcome: "solved".to_string(),
            })
            .inc();

        let output = m.encode();
        assert!(output.contains("mysterd_db_pool_active"));
        assert!(output.contains("mysterd_solves_total 1"));
        assert!(output.contains("mysterd_guesses_total"));
        assert!(output.contains("outcome=\"solved\""));
    }

    #[test]
    fn metrics_default_values_are_zero() {
        let m = Metrics::new();
        let output = m.encode();
        // Gauges should be present but at default (0)
        assert!(output.contains("mysterd_db_pool_active 0"));
        assert!(output.contains("mysterd_db_pool_idle 0"));
    }

    #[test]
    fn metrics_per_outcome_counters_independent() {
        let m = Metrics::new();
        m.guesses
            .get_or_create(&OutcomeLabel {
                outcome: "solved".to_string(),
            })
            .inc_by(3);
        m.guesses
            .get_or_create(&OutcomeLabel {
                outcome: "failed".to_string(),
            })
            .inc_by(7);

        let output = m.encode();
        assert!(output.contains("outcome=\"solved\""));
        assert!(output.contains("outcome=\"failed\""));
    }

    #[test]
    fn http_histogram_records_observations() {
        let m = Metrics::new();
        m.http_request_duration
            .get_or_create(&HttpLabel {
                method: "GET".to_string(),
                path: "/api/game/today".to_string(),
            })
            .observe(0.003);

        let output = m.encode();
        assert!(output.contains("mysterd_http_request_duration_seconds"));
        assert!(output.contains("path=\"/api/game/today\""));
    }
}
