//! Observability infrastructure - tracing and metrics setup

mod config;
mod metrics;
mod tracing_setup;

pub use config::{LogFormat, LoggingConfig, MetricsConfig, ObservabilityConfig};
pub use metrics::{init_metrics, PrometheusMetrics, RecorderMetricsSink};
pub use tracing_setup::init_tracing;
