//! Metrics sink contract

use std::fmt::Debug;

/// Engine-facing metrics capability.
///
/// Implementations must be cheap and must not fail; the engine calls these
/// on the routing hot path and never inspects an outcome.
pub trait MetricsSink: Send + Sync + Debug {
    /// Increment a counter by one
    fn increment_counter(&self, name: &str, tags: &[(String, String)]);

    /// Record a histogram observation
    fn record_histogram(&self, name: &str, value: f64, tags: &[(String, String)]);

    /// Set a gauge to an absolute value
    fn set_gauge(&self, name: &str, value: f64, tags: &[(String, String)]);

    /// Record a summary observation
    fn record_summary(&self, name: &str, value: f64, tags: &[(String, String)]);
}

/// Discards everything, for zero-overhead disablement
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn increment_counter(&self, _name: &str, _tags: &[(String, String)]) {}

    fn record_histogram(&self, _name: &str, _value: f64, _tags: &[(String, String)]) {}

    fn set_gauge(&self, _name: &str, _value: f64, _tags: &[(String, String)]) {}

    fn record_summary(&self, _name: &str, _value: f64, _tags: &[(String, String)]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_sink_accepts_everything() {
        let sink = NoopMetricsSink;
        let tags = vec![("service_type".to_string(), "pricing".to_string())];

        sink.increment_counter("trial_invocations_total", &tags);
        sink.record_histogram("trial_invocation_duration_seconds", 0.25, &tags);
        sink.set_gauge("trial_registrations", 3.0, &tags);
        sink.record_summary("trial_cascade_depth", 2.0, &tags);
    }
}
