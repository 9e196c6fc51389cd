//! Audit events and sinks

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::registration::{ServiceTypeId, TrialKey};

/// What happened during an experiment invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    Started,
    VariantSelected,
    FallbackUsed,
    Succeeded,
    Failed,
    Disabled,
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "started"),
            Self::VariantSelected => write!(f, "variant_selected"),
            Self::FallbackUsed => write!(f, "fallback_used"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

/// One audit record
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub experiment: ServiceTypeId,
    pub event_type: AuditEventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_key: Option<TrialKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    /// Create an event stamped now with a fresh id
    pub fn new(experiment: ServiceTypeId, event_type: AuditEventType) -> Self {
        Self {
            id: Uuid::new_v4(),
            experiment,
            event_type,
            trial_key: None,
            detail: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach the trial key the event concerns
    pub fn with_trial_key(mut self, trial_key: TrialKey) -> Self {
        self.trial_key = Some(trial_key);
        self
    }

    /// Attach free-form detail
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Persists audit events.
///
/// Failures are the sink's own concern; callers in the engine always swallow
/// them so auditing can never change a call outcome.
#[async_trait]
pub trait AuditSink: Send + Sync + fmt::Debug {
    async fn record(&self, event: &AuditEvent) -> Result<(), anyhow::Error>;
}

/// Discards all events
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn record(&self, _event: &AuditEvent) -> Result<(), anyhow::Error> {
        Ok(())
    }
}

/// Fans events out to zero or more child sinks.
///
/// A failing child is logged and skipped; the fan-out always reports
/// success. Children are awaited in order, so cancelling the composite
/// record cancels the in-flight child.
#[derive(Debug, Default)]
pub struct CompositeAuditSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl CompositeAuditSink {
    /// Create a composite over child sinks; an empty list is legal
    pub fn new(sinks: Vec<Arc<dyn AuditSink>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl AuditSink for CompositeAuditSink {
    async fn record(&self, event: &AuditEvent) -> Result<(), anyhow::Error> {
        for sink in &self.sinks {
            if let Err(error) = sink.record(event).await {
                tracing::warn!(%error, event_type = %event.event_type, "Audit sink failed");
            }
        }

        Ok(())
    }
}
