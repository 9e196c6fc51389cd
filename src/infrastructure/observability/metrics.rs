//! Prometheus metrics infrastructure

use std::sync::Arc;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;
use crate::domain::telemetry::MetricsSink;

/// Prometheus metrics handle for rendering scrape output
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Render the current metrics in Prometheus exposition format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the Prometheus recorder as the global metrics recorder
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    let builder = PrometheusBuilder::new();

    match builder.install_recorder() {
        Ok(handle) => {
            gauge!("trial_router_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Metrics sink forwarding to the globally installed recorder.
///
/// Pair with [`init_metrics`] for Prometheus export, or with any other
/// recorder an embedder installs through the `metrics` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecorderMetricsSink;

impl RecorderMetricsSink {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsSink for RecorderMetricsSink {
    fn increment_counter(&self, name: &str, tags: &[(String, String)]) {
        counter!(name.to_string(), tags).increment(1);
    }

    fn record_histogram(&self, name: &str, value: f64, tags: &[(String, String)]) {
        histogram!(name.to_string(), tags).record(value);
    }

    fn set_gauge(&self, name: &str, value: f64, tags: &[(String, String)]) {
        gauge!(name.to_string(), tags).set(value);
    }

    fn record_summary(&self, name: &str, value: f64, tags: &[(String, String)]) {
        // The Prometheus exporter renders histograms with summary quantiles,
        // so summaries share the histogram pathway.
        histogram!(name.to_string(), tags).record(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_metrics_installs_nothing() {
        let metrics = init_metrics(&MetricsConfig { enabled: false });
        assert!(metrics.is_none());
    }

    #[test]
    fn test_recorder_sink_accepts_calls_without_recorder() {
        // Without an installed recorder the facade drops everything; the
        // sink must still be callable.
        let sink = RecorderMetricsSink::new();
        let tags = vec![("service_type".to_string(), "pricing".to_string())];

        sink.increment_counter("trial_invocations_total", &tags);
        sink.record_histogram("trial_invocation_duration_seconds", 0.1, &tags);
        sink.set_gauge("trial_registrations", 1.0, &tags);
        sink.record_summary("trial_cascade_depth", 2.0, &tags);
    }
}
