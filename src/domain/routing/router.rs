//! Invocation router - orchestrates selection, cascade, and resilience per
//! call

use serde_json::Value;
use std::sync::Arc;

use super::cascade::build_candidates;
use super::decorator::{compose, InvocationFuture};
use super::invocation::{ImplementationResolver, InvocationContext, RouteRequest};
use crate::domain::activation::{ActivationEvaluator, Clock, SystemClock};
use crate::domain::error::RouterError;
use crate::domain::registration::{
    ErrorPolicy, Registration, SelectionMode, TimeoutAction, TimeoutOptions, TrialKey,
};
use crate::domain::resilience::OnCircuitOpen;
use crate::domain::selection::{
    BooleanFlagProvider, ConfigSource, ConfigurationValueProvider, CustomProviderRegistry,
    FlagSource, SelectionContext, SelectionProvider, StickyProvider,
};
use crate::domain::telemetry::{AuditEvent, AuditEventType, TelemetryScope};

/// Routes calls for registered service types through the selection,
/// cascade, and resilience machinery.
///
/// Holds no per-call state; everything per call is allocated fresh, so the
/// router is shared freely across concurrent callers.
#[derive(Debug)]
pub struct InvocationRouter {
    resolver: Arc<dyn ImplementationResolver>,
    flag_source: Option<Arc<dyn FlagSource>>,
    config_source: Option<Arc<dyn ConfigSource>>,
    custom_providers: Arc<CustomProviderRegistry>,
    clock: Arc<dyn Clock>,
}

impl InvocationRouter {
    /// Create a router over an implementation resolver
    pub fn new(resolver: Arc<dyn ImplementationResolver>) -> Self {
        Self {
            resolver,
            flag_source: None,
            config_source: None,
            custom_providers: Arc::new(CustomProviderRegistry::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Back the boolean-flag selection mode with a flag source
    pub fn with_flag_source(mut self, source: Arc<dyn FlagSource>) -> Self {
        self.flag_source = Some(source);
        self
    }

    /// Back the configuration-value selection mode with a config source
    pub fn with_config_source(mut self, source: Arc<dyn ConfigSource>) -> Self {
        self.config_source = Some(source);
        self
    }

    /// Use a shared custom provider registry
    pub fn with_custom_providers(mut self, registry: Arc<CustomProviderRegistry>) -> Self {
        self.custom_providers = registry;
        self
    }

    /// Override the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get the custom provider registry for external registrations
    pub fn custom_providers(&self) -> &Arc<CustomProviderRegistry> {
        &self.custom_providers
    }

    /// Route one call.
    ///
    /// Inactive registrations invoke the default trial directly, skipping
    /// selection, cascade, resilience gates, and experiment telemetry. A
    /// whole-experiment kill switch is a hard stop before any candidate.
    pub async fn invoke(
        &self,
        registration: &Registration,
        request: RouteRequest,
    ) -> Result<Value, RouterError> {
        if !ActivationEvaluator::is_active(registration, self.clock.now()) {
            tracing::debug!(
                service_type = %registration.service_type(),
                "Registration inactive, invoking default trial directly"
            );
            return self
                .attempt(registration, registration.default_key(), &request, false)
                .await;
        }

        if let Some(kill_switch) = registration.kill_switch() {
            if kill_switch.is_experiment_disabled(registration.service_type()) {
                let event = AuditEvent::new(
                    registration.service_type().clone(),
                    AuditEventType::Disabled,
                );
                if let Err(error) = registration.audit().record(&event).await {
                    tracing::debug!(%error, "Audit sink failed, ignoring");
                }

                return Err(RouterError::ExperimentDisabled {
                    service_type: registration.service_type().clone(),
                });
            }
        }

        let (preferred, source) = self.select_preferred(registration, &request).await;
        let candidates = build_candidates(&preferred, registration);

        let scope = TelemetryScope::start_invocation(
            registration,
            request.method_name(),
            &preferred,
            candidates.keys(),
        )
        .await;
        scope.record_variant(&preferred, source).await;

        let mut last_error: Option<RouterError> = None;

        for (index, candidate) in candidates.iter().enumerate() {
            match self.attempt(registration, candidate, &request, true).await {
                Ok(value) => {
                    if index > 0 {
                        scope.record_fallback(candidate).await;
                    }
                    scope.record_success().await;
                    scope.dispose();
                    return Ok(value);
                }
                Err(error) => {
                    if self.should_fallback_to_default(registration, candidate, &error) {
                        tracing::warn!(
                            service_type = %registration.service_type(),
                            trial_key = %candidate,
                            "Attempt timed out, short-circuiting to default trial"
                        );

                        let outcome = self
                            .invoke_through_pipeline(
                                registration,
                                registration.default_key(),
                                &request,
                                None,
                            )
                            .await;

                        return match outcome {
                            Ok(value) => {
                                scope.record_fallback(registration.default_key()).await;
                                scope.record_success().await;
                                scope.dispose();
                                Ok(value)
                            }
                            Err(fallback_error) => {
                                scope.record_failure(&fallback_error).await;
                                scope.dispose();
                                Err(fallback_error)
                            }
                        };
                    }

                    let circuit_hard_stop = matches!(&error, RouterError::CircuitOpen { .. })
                        && registration
                            .circuit_breaker()
                            .map(|breaker| breaker.options().on_open)
                            == Some(OnCircuitOpen::Throw);

                    if circuit_hard_stop
                        || matches!(registration.error_policy(), ErrorPolicy::Throw)
                    {
                        scope.record_failure(&error).await;
                        scope.dispose();
                        return Err(error);
                    }

                    tracing::debug!(
                        service_type = %registration.service_type(),
                        trial_key = %candidate,
                        kind = error.kind(),
                        "Candidate failed, continuing cascade"
                    );
                    last_error = Some(error);
                }
            }
        }

        let error = last_error
            .unwrap_or_else(|| RouterError::internal("Candidate cascade produced no attempts"));
        scope.record_failure(&error).await;
        scope.dispose();
        Err(error)
    }

    /// One candidate attempt: kill switch, circuit breaker, then the
    /// timeout-wrapped decorator pipeline. Gates and breaker recording are
    /// skipped on the inactive-registration path.
    async fn attempt(
        &self,
        registration: &Registration,
        candidate: &TrialKey,
        request: &RouteRequest,
        gated: bool,
    ) -> Result<Value, RouterError> {
        if gated {
            if let Some(kill_switch) = registration.kill_switch() {
                if kill_switch.is_trial_disabled(registration.service_type(), candidate) {
                    return Err(RouterError::TrialDisabled {
                        service_type: registration.service_type().clone(),
                        trial_key: candidate.clone(),
                    });
                }
            }

            if let Some(breaker) = registration.circuit_breaker() {
                if !breaker.try_acquire() {
                    return Err(RouterError::CircuitOpen {
                        service_type: registration.service_type().clone(),
                    });
                }
            }
        }

        let result = self
            .invoke_through_pipeline(registration, candidate, request, registration.timeout())
            .await;

        if gated {
            if let Some(breaker) = registration.circuit_breaker() {
                match &result {
                    Ok(_) => breaker.record_success(),
                    Err(_) => breaker.record_failure(),
                }
            }
        }

        result
    }

    async fn invoke_through_pipeline(
        &self,
        registration: &Registration,
        candidate: &TrialKey,
        request: &RouteRequest,
        timeout: Option<&TimeoutOptions>,
    ) -> Result<Value, RouterError> {
        // Stale or externally configured keys resolve to the default
        // implementation instead of failing the lookup.
        let resolve_key = if registration.has_trial(candidate) {
            candidate
        } else {
            tracing::warn!(
                service_type = %registration.service_type(),
                trial_key = %candidate,
                "Candidate key not declared, resolving default implementation"
            );
            registration.default_key()
        };

        let implementation = self
            .resolver
            .resolve(registration.service_type(), resolve_key)
            .await?;

        let context = InvocationContext::new(
            registration.service_type().clone(),
            request.method_name(),
            candidate.clone(),
            request.arguments().to_vec(),
        );

        let decorators = registration
            .decorator_factories()
            .iter()
            .map(|factory| factory.create())
            .collect();

        let trial_key = candidate.clone();
        let terminal: InvocationFuture<'_> = Box::pin(async {
            implementation
                .invoke(&context)
                .await
                .map_err(|source| RouterError::implementation(trial_key, source))
        });
        let invocation = compose(decorators, &context, terminal);

        match timeout {
            Some(options) => match tokio::time::timeout(options.duration(), invocation).await {
                Ok(result) => result,
                // The abandoned invocation is dropped here; its eventual
                // completion never reaches telemetry.
                Err(_) => Err(RouterError::Timeout {
                    trial_key: candidate.clone(),
                    timeout_ms: options.timeout_ms,
                }),
            },
            None => invocation.await,
        }
    }

    fn should_fallback_to_default(
        &self,
        registration: &Registration,
        candidate: &TrialKey,
        error: &RouterError,
    ) -> bool {
        matches!(error, RouterError::Timeout { .. })
            && registration.timeout().map(|options| options.action)
                == Some(TimeoutAction::FallbackToDefault)
            && candidate != registration.default_key()
    }

    /// Resolve the preferred key through the registration's selection mode.
    ///
    /// Any empty, missing, or failed provider result uniformly becomes the
    /// default key, so the default is the preferred candidate rather than a
    /// later fallback.
    async fn select_preferred(
        &self,
        registration: &Registration,
        request: &RouteRequest,
    ) -> (TrialKey, &'static str) {
        let context =
            SelectionContext::for_call(registration, request.identity().map(String::from));

        let outcome = match registration.selection_mode() {
            SelectionMode::BooleanFlag => match &self.flag_source {
                Some(source) => {
                    BooleanFlagProvider::new(source.clone())
                        .select_trial_key(&context)
                        .await
                }
                None => {
                    tracing::warn!(
                        service_type = %registration.service_type(),
                        "Boolean-flag selection without a flag source"
                    );
                    Ok(None)
                }
            },
            SelectionMode::ConfigurationValue => match &self.config_source {
                Some(source) => {
                    ConfigurationValueProvider::new(source.clone())
                        .select_trial_key(&context)
                        .await
                }
                None => {
                    tracing::warn!(
                        service_type = %registration.service_type(),
                        "Configuration-value selection without a config source"
                    );
                    Ok(None)
                }
            },
            SelectionMode::Sticky => StickyProvider::new().select_trial_key(&context).await,
            SelectionMode::Custom { mode_id } => match self.custom_providers.get(mode_id) {
                Some(provider) => provider.select_trial_key(&context).await,
                None => {
                    tracing::warn!(
                        service_type = %registration.service_type(),
                        mode_id,
                        "No custom selection provider registered"
                    );
                    Ok(None)
                }
            },
        };

        match outcome {
            Ok(Some(key)) => (key, registration.selection_mode().label()),
            Ok(None) => (registration.default_key().clone(), "default"),
            Err(error) => {
                tracing::warn!(
                    service_type = %registration.service_type(),
                    %error,
                    "Selection provider failed, using default key"
                );
                (registration.default_key().clone(), "default")
            }
        }
    }
}
