//! Registration domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::validation::{
    validate_service_type_id, validate_trial_key, RegistrationValidationError,
};
use crate::domain::activation::ActivationPredicate;
use crate::domain::resilience::{CircuitBreaker, KillSwitch};
use crate::domain::routing::DecoratorFactory;
use crate::domain::telemetry::{AuditSink, MetricsSink};

// ============================================================================
// ServiceTypeId
// ============================================================================

/// Unique identifier for a routed service type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceTypeId(String);

impl ServiceTypeId {
    /// Create a new service type ID with validation
    pub fn new(id: impl Into<String>) -> Result<Self, RegistrationValidationError> {
        let id = id.into();
        validate_service_type_id(&id)?;
        Ok(Self(id))
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ServiceTypeId {
    type Error = RegistrationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServiceTypeId> for String {
    fn from(id: ServiceTypeId) -> Self {
        id.0
    }
}

impl fmt::Display for ServiceTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ServiceTypeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// TrialKey
// ============================================================================

/// Key naming one candidate implementation within a registration
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrialKey(String);

impl TrialKey {
    /// Create a new trial key with validation
    pub fn new(key: impl Into<String>) -> Result<Self, RegistrationValidationError> {
        let key = key.into();
        validate_trial_key(&key)?;
        Ok(Self(key))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TrialKey {
    type Error = RegistrationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TrialKey> for String {
    fn from(key: TrialKey) -> Self {
        key.0
    }
}

impl fmt::Display for TrialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TrialKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Trial
// ============================================================================

/// One named candidate implementation of a service type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trial {
    key: TrialKey,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl Trial {
    /// Create a new trial
    pub fn new(key: TrialKey, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            description: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Get the trial key
    pub fn key(&self) -> &TrialKey {
        &self.key
    }

    /// Get the trial name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the description
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

// ============================================================================
// SelectionMode
// ============================================================================

/// Strategy used to pick the preferred trial key for a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionMode {
    /// An external on/off flag mapped to the fixed keys "true"/"false"
    BooleanFlag,
    /// A string configuration value naming the preferred key
    ConfigurationValue,
    /// Deterministic identity-based assignment
    Sticky,
    /// An externally registered provider looked up by mode identifier
    Custom { mode_id: String },
}

impl SelectionMode {
    /// Short label used as the telemetry variant source
    pub fn label(&self) -> &'static str {
        match self {
            Self::BooleanFlag => "flag",
            Self::ConfigurationValue => "config",
            Self::Sticky => "sticky",
            Self::Custom { .. } => "custom",
        }
    }
}

// ============================================================================
// ErrorPolicy
// ============================================================================

/// Rule for expanding a preferred key into an ordered fallback cascade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Surface the first failure immediately, no fallback
    Throw,
    /// Fall back to the default trial
    RedirectDefault,
    /// Fall back to every other trial, lexicographic order
    RedirectAny,
    /// Fall back to one specific trial
    RedirectSpecific { fallback: TrialKey },
    /// Fall back along a caller-specified key order
    RedirectOrdered { keys: Vec<TrialKey> },
}

// ============================================================================
// Timeout
// ============================================================================

/// What to do when a candidate attempt exceeds its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutAction {
    /// Raise a timeout error, handled like any other attempt failure
    #[default]
    ThrowException,
    /// Short-circuit directly to the default trial's implementation
    FallbackToDefault,
}

/// Deadline configuration for candidate attempts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutOptions {
    /// Deadline in milliseconds
    pub timeout_ms: u64,
    /// Action taken on expiry
    #[serde(default)]
    pub action: TimeoutAction,
}

impl TimeoutOptions {
    /// Create timeout options with the default (throw) action
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            action: TimeoutAction::default(),
        }
    }

    /// Set the expiry action
    pub fn with_action(mut self, action: TimeoutAction) -> Self {
        self.action = action;
        self
    }

    /// Get the deadline as a `Duration`
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ============================================================================
// Registration
// ============================================================================

/// Immutable per-service-type routing declaration.
///
/// Built through [`RegistrationBuilder`](super::RegistrationBuilder), which
/// validates and freezes the value before any call is served. Shared mutable
/// state (circuit breaker, kill switch) is owned here as explicit `Arc`s so
/// tests can construct isolated instances per case.
#[derive(Debug, Clone)]
pub struct Registration {
    pub(super) service_type: ServiceTypeId,
    pub(super) trials: HashMap<TrialKey, Trial>,
    pub(super) default_key: TrialKey,
    pub(super) selection_mode: SelectionMode,
    pub(super) selector_name: String,
    pub(super) error_policy: ErrorPolicy,
    pub(super) start_time: Option<DateTime<Utc>>,
    pub(super) end_time: Option<DateTime<Utc>>,
    pub(super) activation_predicate: Option<Arc<dyn ActivationPredicate>>,
    pub(super) timeout: Option<TimeoutOptions>,
    pub(super) circuit_breaker: Option<Arc<CircuitBreaker>>,
    pub(super) kill_switch: Option<Arc<KillSwitch>>,
    pub(super) metrics: Arc<dyn MetricsSink>,
    pub(super) audit: Arc<dyn AuditSink>,
    pub(super) decorator_factories: Vec<Arc<dyn DecoratorFactory>>,
}

impl Registration {
    /// Get the service type ID
    pub fn service_type(&self) -> &ServiceTypeId {
        &self.service_type
    }

    /// Get the declared trials, keyed by trial key
    pub fn trials(&self) -> &HashMap<TrialKey, Trial> {
        &self.trials
    }

    /// Get the declared trial keys, sorted for reproducible iteration
    pub fn sorted_trial_keys(&self) -> Vec<TrialKey> {
        let mut keys: Vec<TrialKey> = self.trials.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Get the default trial key
    pub fn default_key(&self) -> &TrialKey {
        &self.default_key
    }

    /// Get the selection mode
    pub fn selection_mode(&self) -> &SelectionMode {
        &self.selection_mode
    }

    /// Get the selector name queried by selection providers
    pub fn selector_name(&self) -> &str {
        &self.selector_name
    }

    /// Get the error policy
    pub fn error_policy(&self) -> &ErrorPolicy {
        &self.error_policy
    }

    /// Get the activation window start, if bounded
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    /// Get the activation window end, if bounded
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Get the activation predicate, if configured
    pub fn activation_predicate(&self) -> Option<&Arc<dyn ActivationPredicate>> {
        self.activation_predicate.as_ref()
    }

    /// Get the timeout options, if configured
    pub fn timeout(&self) -> Option<&TimeoutOptions> {
        self.timeout.as_ref()
    }

    /// Get the circuit breaker, if configured
    pub fn circuit_breaker(&self) -> Option<&Arc<CircuitBreaker>> {
        self.circuit_breaker.as_ref()
    }

    /// Get the kill switch reference, if configured
    pub fn kill_switch(&self) -> Option<&Arc<KillSwitch>> {
        self.kill_switch.as_ref()
    }

    /// Get the metrics sink
    pub fn metrics(&self) -> &Arc<dyn MetricsSink> {
        &self.metrics
    }

    /// Get the audit sink
    pub fn audit(&self) -> &Arc<dyn AuditSink> {
        &self.audit
    }

    /// Get the ordered decorator factories
    pub fn decorator_factories(&self) -> &[Arc<dyn DecoratorFactory>] {
        &self.decorator_factories
    }

    /// Check whether a trial key is declared on this registration
    pub fn has_trial(&self, key: &TrialKey) -> bool {
        self.trials.contains_key(key)
    }

    /// Check whether `now` falls inside the registration's time window
    pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
        if let Some(start) = self.start_time {
            if now < start {
                return false;
            }
        }

        if let Some(end) = self.end_time {
            if now > end {
                return false;
            }
        }

        true
    }
}
