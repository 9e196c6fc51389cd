//! Telemetry domain module
//!
//! Metrics, audit, and the per-invocation scope. Everything here is
//! fire-and-forget from the router's point of view: sink failures are
//! logged and swallowed, never surfaced to callers.

mod audit;
mod metrics;
mod scope;

pub use audit::{AuditEvent, AuditEventType, AuditSink, CompositeAuditSink, NoopAuditSink};
pub use metrics::{MetricsSink, NoopMetricsSink};
pub use scope::TelemetryScope;
