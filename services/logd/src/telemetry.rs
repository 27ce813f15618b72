//! Logs and metrics wiring
//!
//! Tracing goes through `tracing-subscriber` with `RUST_LOG` filtering.
//! Metrics are recorded through the `metrics` facade and exposed in
//! Prometheus format; the handle is stored once at startup and rendered by
//! the `/metrics` route.

use anyhow::Result;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Prometheus-style linear buckets: `count` buckets of `width` starting at
/// `start`.
fn linear_buckets(start: f64, width: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + width * i as f64).collect()
}

/// Initialize tracing and the Prometheus recorder. Call once at startup,
/// before the first request.
pub fn init_telemetry() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "logd=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let handle = install_recorder()?;
    if PROM_HANDLE.set(handle).is_err() {
        tracing::warn!("Prometheus handle already set; telemetry re-initialized?");
    }

    Ok(())
}

/// Install the metrics recorder and register metric metadata. Split out of
/// [`init_telemetry`] so tests can install a recorder without touching the
/// tracing subscriber.
pub fn install_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("log_handler_time_seconds".into()),
            &linear_buckets(0.0, 0.05, 100),
        )?
        .set_buckets_for_metric(
            Matcher::Full("transaction_time_seconds".into()),
            &linear_buckets(0.0, 0.05, 100),
        )?
        .set_buckets_for_metric(
            Matcher::Full("update_time_seconds".into()),
            &linear_buckets(0.0, 0.005, 100),
        )?
        .install_recorder()?;

    metrics::describe_counter!(
        "add_chain_outcome_total",
        "Number of requests with each outcome."
    );
    metrics::describe_histogram!(
        "log_handler_time_seconds",
        "The overall time for the log HTTP handler to return."
    );
    metrics::describe_histogram!(
        "transaction_time_seconds",
        "The time the DB transaction was active."
    );
    metrics::describe_histogram!(
        "update_time_seconds",
        "The time spent updating the frontier, exclusive of DB interaction."
    );

    Ok(handle)
}

/// Render the current metric state in Prometheus exposition format.
pub fn render_metrics() -> String {
    match PROM_HANDLE.get() {
        Some(handle) => handle.render(),
        None => "# metrics not initialized\n".to_string(),
    }
}

/// Observes `transaction_time_seconds` when dropped, so the observation
/// fires exactly once whether the transaction commits or rolls back.
pub struct TransactionTimer(Instant);

impl TransactionTimer {
    pub fn start() -> Self {
        Self(Instant::now())
    }
}

impl Drop for TransactionTimer {
    fn drop(&mut self) {
        metrics::histogram!("transaction_time_seconds", self.0.elapsed().as_secs_f64());
    }
}
