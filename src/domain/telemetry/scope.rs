//! Per-invocation telemetry scope

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::audit::{AuditEvent, AuditEventType, AuditSink};
use super::metrics::MetricsSink;
use crate::domain::error::RouterError;
use crate::domain::registration::{Registration, ServiceTypeId, TrialKey};

/// Telemetry surface wrapped around one experiment invocation.
///
/// Every recording method swallows sink failures: telemetry must never
/// affect the call outcome. `dispose` is idempotent and also runs on drop,
/// so an abandoned scope still closes out its duration metric.
pub struct TelemetryScope {
    service_type: ServiceTypeId,
    method_name: String,
    selector_name: String,
    metrics: Arc<dyn MetricsSink>,
    audit: Arc<dyn AuditSink>,
    started_at: Instant,
    disposed: AtomicBool,
}

impl TelemetryScope {
    /// Open a scope and emit the start event
    pub async fn start_invocation(
        registration: &Registration,
        method_name: &str,
        preferred: &TrialKey,
        candidates: &[TrialKey],
    ) -> Self {
        let scope = Self {
            service_type: registration.service_type().clone(),
            method_name: method_name.to_string(),
            selector_name: registration.selector_name().to_string(),
            metrics: registration.metrics().clone(),
            audit: registration.audit().clone(),
            started_at: Instant::now(),
            disposed: AtomicBool::new(false),
        };

        scope.metrics.increment_counter(
            "trial_invocations_total",
            &scope.tags(&[("method", method_name)]),
        );

        let candidate_names: Vec<&str> = candidates.iter().map(|k| k.as_str()).collect();
        scope
            .record_audit(
                AuditEvent::new(scope.service_type.clone(), AuditEventType::Started)
                    .with_trial_key(preferred.clone())
                    .with_detail(format!("candidates: {}", candidate_names.join(", "))),
            )
            .await;

        scope
    }

    /// Record which variant was selected and by what source
    pub async fn record_variant(&self, variant: &TrialKey, source: &str) {
        self.metrics.increment_counter(
            "trial_variant_selected_total",
            &self.tags(&[("trial_key", variant.as_str()), ("source", source)]),
        );

        self.record_audit(
            AuditEvent::new(self.service_type.clone(), AuditEventType::VariantSelected)
                .with_trial_key(variant.clone())
                .with_detail(source.to_string()),
        )
        .await;
    }

    /// Record that a fallback candidate ended up serving the call
    pub async fn record_fallback(&self, used: &TrialKey) {
        self.metrics.increment_counter(
            "trial_fallback_used_total",
            &self.tags(&[("trial_key", used.as_str())]),
        );

        self.record_audit(
            AuditEvent::new(self.service_type.clone(), AuditEventType::FallbackUsed)
                .with_trial_key(used.clone()),
        )
        .await;
    }

    /// Record the call succeeding
    pub async fn record_success(&self) {
        self.metrics
            .increment_counter("trial_invocation_success_total", &self.tags(&[]));

        self.record_audit(AuditEvent::new(
            self.service_type.clone(),
            AuditEventType::Succeeded,
        ))
        .await;
    }

    /// Record the call failing terminally
    pub async fn record_failure(&self, error: &RouterError) {
        self.metrics.increment_counter(
            "trial_invocation_failure_total",
            &self.tags(&[("kind", error.kind())]),
        );

        self.record_audit(
            AuditEvent::new(self.service_type.clone(), AuditEventType::Failed)
                .with_detail(error.to_string()),
        )
        .await;
    }

    /// Close the scope, recording the total invocation duration once.
    ///
    /// Safe to call multiple times; only the first call records.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.metrics.record_histogram(
            "trial_invocation_duration_seconds",
            self.started_at.elapsed().as_secs_f64(),
            &self.tags(&[("method", self.method_name.as_str())]),
        );
    }

    fn tags(&self, extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut tags = vec![
            ("service_type".to_string(), self.service_type.to_string()),
            ("selector".to_string(), self.selector_name.clone()),
        ];

        for (name, value) in extra {
            tags.push((name.to_string(), value.to_string()));
        }

        tags
    }

    async fn record_audit(&self, event: AuditEvent) {
        if let Err(error) = self.audit.record(&event).await {
            tracing::debug!(%error, "Audit sink failed, ignoring");
        }
    }
}

impl Drop for TelemetryScope {
    fn drop(&mut self) {
        self.dispose();
    }
}
