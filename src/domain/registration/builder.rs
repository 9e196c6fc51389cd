//! Builder producing validated, frozen [`Registration`] values

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use super::entity::{
    ErrorPolicy, Registration, SelectionMode, ServiceTypeId, TimeoutOptions, Trial, TrialKey,
};
use super::validation::RegistrationValidationError;
use crate::domain::activation::ActivationPredicate;
use crate::domain::resilience::{CircuitBreaker, CircuitBreakerOptions, KillSwitch};
use crate::domain::routing::DecoratorFactory;
use crate::domain::selection::{default_selector_name, NamingConvention};
use crate::domain::telemetry::{AuditSink, MetricsSink, NoopAuditSink, NoopMetricsSink};

/// Builder for [`Registration`].
///
/// Collects mutable configuration, then `build()` validates and freezes it.
/// Fallback-key existence for `RedirectSpecific`/`RedirectOrdered` is not
/// checked here; the conflict detector validates it across whole
/// registration sets before any call is served.
#[derive(Debug)]
pub struct RegistrationBuilder {
    service_type: ServiceTypeId,
    trials: Vec<Trial>,
    default_key: Option<TrialKey>,
    selection_mode: SelectionMode,
    selector_name: Option<String>,
    naming_convention: NamingConvention,
    error_policy: ErrorPolicy,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    activation_predicate: Option<Arc<dyn ActivationPredicate>>,
    timeout: Option<TimeoutOptions>,
    circuit_breaker_options: Option<CircuitBreakerOptions>,
    kill_switch: Option<Arc<KillSwitch>>,
    metrics: Option<Arc<dyn MetricsSink>>,
    audit: Option<Arc<dyn AuditSink>>,
    decorator_factories: Vec<Arc<dyn DecoratorFactory>>,
}

impl Registration {
    /// Start building a registration for a service type
    pub fn builder(service_type: ServiceTypeId) -> RegistrationBuilder {
        RegistrationBuilder::new(service_type)
    }
}

impl RegistrationBuilder {
    /// Create a builder for a service type
    pub fn new(service_type: ServiceTypeId) -> Self {
        Self {
            service_type,
            trials: Vec::new(),
            default_key: None,
            selection_mode: SelectionMode::ConfigurationValue,
            selector_name: None,
            naming_convention: NamingConvention::AsIs,
            error_policy: ErrorPolicy::RedirectDefault,
            start_time: None,
            end_time: None,
            activation_predicate: None,
            timeout: None,
            circuit_breaker_options: None,
            kill_switch: None,
            metrics: None,
            audit: None,
            decorator_factories: Vec::new(),
        }
    }

    /// Declare a trial
    pub fn trial(mut self, trial: Trial) -> Self {
        self.trials.push(trial);
        self
    }

    /// Set the default trial key
    pub fn default_key(mut self, key: TrialKey) -> Self {
        self.default_key = Some(key);
        self
    }

    /// Set the selection mode
    pub fn selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Set an explicit selector name, overriding the naming convention
    pub fn selector_name(mut self, name: impl Into<String>) -> Self {
        self.selector_name = Some(name.into());
        self
    }

    /// Set the naming convention used to default the selector name
    pub fn naming_convention(mut self, convention: NamingConvention) -> Self {
        self.naming_convention = convention;
        self
    }

    /// Set the error policy
    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Bound the activation window start
    pub fn start_time(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Bound the activation window end
    pub fn end_time(mut self, end: DateTime<Utc>) -> Self {
        self.end_time = Some(end);
        self
    }

    /// Attach an activation predicate
    pub fn activation_predicate(mut self, predicate: Arc<dyn ActivationPredicate>) -> Self {
        self.activation_predicate = Some(predicate);
        self
    }

    /// Enforce a per-attempt deadline
    pub fn timeout(mut self, timeout: TimeoutOptions) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Guard attempts with a circuit breaker
    pub fn circuit_breaker(mut self, options: CircuitBreakerOptions) -> Self {
        self.circuit_breaker_options = Some(options);
        self
    }

    /// Attach a kill switch reference
    pub fn kill_switch(mut self, kill_switch: Arc<KillSwitch>) -> Self {
        self.kill_switch = Some(kill_switch);
        self
    }

    /// Set the metrics sink
    pub fn metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Set the audit sink
    pub fn audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Append a decorator factory; first appended wraps outermost
    pub fn decorator_factory(mut self, factory: Arc<dyn DecoratorFactory>) -> Self {
        self.decorator_factories.push(factory);
        self
    }

    /// Validate and freeze the registration
    pub fn build(self) -> Result<Registration, RegistrationValidationError> {
        if self.trials.is_empty() {
            return Err(RegistrationValidationError::NoTrials);
        }

        let mut trials: HashMap<TrialKey, Trial> = HashMap::with_capacity(self.trials.len());

        for trial in self.trials {
            let key = trial.key().clone();

            if trials.insert(key.clone(), trial).is_some() {
                return Err(RegistrationValidationError::DuplicateTrialKey(
                    key.as_str().to_string(),
                ));
            }
        }

        let default_key = self
            .default_key
            .ok_or(RegistrationValidationError::MissingDefaultKey)?;

        if !trials.contains_key(&default_key) {
            return Err(RegistrationValidationError::UnknownDefaultKey(
                default_key.as_str().to_string(),
            ));
        }

        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end < start {
                return Err(RegistrationValidationError::InvertedTimeWindow);
            }
        }

        let selector_name = self.selector_name.unwrap_or_else(|| {
            default_selector_name(&self.service_type, &self.naming_convention)
        });

        let circuit_breaker = self
            .circuit_breaker_options
            .map(|options| Arc::new(CircuitBreaker::new(options)));

        Ok(Registration {
            service_type: self.service_type,
            trials,
            default_key,
            selection_mode: self.selection_mode,
            selector_name,
            error_policy: self.error_policy,
            start_time: self.start_time,
            end_time: self.end_time,
            activation_predicate: self.activation_predicate,
            timeout: self.timeout,
            circuit_breaker,
            kill_switch: self.kill_switch,
            metrics: self.metrics.unwrap_or_else(|| Arc::new(NoopMetricsSink)),
            audit: self.audit.unwrap_or_else(|| Arc::new(NoopAuditSink)),
            decorator_factories: self.decorator_factories,
        })
    }
}
