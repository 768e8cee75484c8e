//! Tracing and metrics initialisation for the binary.

use config::ObservabilityConfig;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::{ApiError, Result};

/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(config: &ObservabilityConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    // A subscriber may already be installed, e.g. by a test harness.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Installs the global Prometheus recorder and describes the service metrics.
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ApiError::Server(format!("Failed to install metrics recorder: {e}")))?;

    metrics::describe_counter!(
        "sparks_captures_total",
        "Normalization attempts by outcome",
    );
    metrics::describe_histogram!(
        "sparks_completion_duration_ms",
        metrics::Unit::Milliseconds,
        "Latency of completion service calls",
    );
    metrics::describe_counter!("sparks_ideas_created_total", "Ideas confirmed and stored");

    Ok(handle)
}
