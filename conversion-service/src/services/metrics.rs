//! Metrics collection and Prometheus export.
//!
//! Initializes the metrics exporter, renders the /metrics payload and holds
//! the counters the conversion pipeline records.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the metrics recorder.
///
/// This must be called once at startup before any metrics are recorded.
/// Later calls are ignored.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => tracing::warn!(error = %e, "Failed to install Prometheus recorder"),
    }
}

/// Get the current metrics in Prometheus text format.
///
/// Returns a string suitable for the /metrics HTTP endpoint.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

pub fn record_job_started() {
    metrics::counter!("conversion_jobs_total").increment(1);
}

pub fn record_job_succeeded(elapsed: Duration) {
    metrics::histogram!("conversion_job_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_job_failed(stage: &'static str) {
    metrics::counter!("conversion_jobs_failed_total", "stage" => stage).increment(1);
}
