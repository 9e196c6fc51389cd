//! PMP Trial Router
//!
//! A call-routing and resilience engine: callers depend on one abstract
//! service interface while the implementation actually invoked is chosen
//! per call from a set of registered trials. Supports:
//! - Pluggable selection strategies (boolean flag, config value, sticky
//!   hash, custom providers)
//! - Error-policy fallback cascades across candidate trials
//! - Kill switch, per-registration circuit breaker, and timeout enforcement
//! - A per-call decorator pipeline for cross-cutting concerns
//! - Pre-flight conflict detection over registration sets

pub mod domain;
pub mod infrastructure;

pub use domain::{
    ActivationEvaluator, ActivationPredicate, AuditEvent, AuditEventType, AuditSink,
    BooleanFlagProvider, CandidateList, CircuitBreaker, CircuitBreakerOptions, CircuitState, Clock,
    CompositeAuditSink, ConfigSource, ConfigurationValueProvider, Conflict, ConflictDetector,
    ConflictError, CustomProviderRegistry, DecoratorFactory, ErrorPolicy, FixedClock, FlagSource,
    FnPredicate, ImplementationResolver, InvocationContext, InvocationDecorator, InvocationRouter,
    KillSwitch, MetricsSink, NamingConvention, NoopAuditSink, NoopMetricsSink, OnCircuitOpen,
    Registration, RegistrationBuilder, RegistrationValidationError, RouteRequest, RouterError,
    SelectionContext, SelectionMode, SelectionProvider, ServiceTypeId, StickyRouter, SystemClock,
    TelemetryScope, TimeoutAction, TimeoutOptions, Trial, TrialImplementation, TrialKey,
};
pub use infrastructure::{
    InMemoryConfigSource, InMemoryFlagSource, InMemoryRegistrationRegistry, RoutingService,
};
