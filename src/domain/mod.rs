//! Domain layer - Core routing logic and entities

pub mod activation;
pub mod conflict;
pub mod error;
pub mod registration;
pub mod resilience;
pub mod routing;
pub mod selection;
pub mod telemetry;

pub use activation::{
    ActivationEvaluator, ActivationPredicate, Clock, FixedClock, FnPredicate, SystemClock,
};
pub use conflict::{Conflict, ConflictDetector, ConflictError};
pub use error::RouterError;
pub use registration::{
    validate_service_type_id, validate_trial_key, ErrorPolicy, Registration, RegistrationBuilder,
    RegistrationValidationError, SelectionMode, ServiceTypeId, TimeoutAction, TimeoutOptions,
    Trial, TrialKey,
};
pub use resilience::{
    CircuitBreaker, CircuitBreakerOptions, CircuitState, KillSwitch, OnCircuitOpen,
};
pub use routing::{
    build_candidates, CandidateList, DecoratorFactory, ErrorLoggingDecoratorFactory,
    ImplementationResolver, InvocationContext, InvocationDecorator, InvocationFuture,
    InvocationRouter, RouteRequest, TimingDecoratorFactory, TrialImplementation,
};
pub use selection::{
    default_selector_name, BooleanFlagProvider, ConfigSource, ConfigurationValueProvider,
    CustomProviderRegistry, FlagSource, NamingConvention, SelectionContext, SelectionProvider,
    StickyProvider, StickyRouter,
};
pub use telemetry::{
    AuditEvent, AuditEventType, AuditSink, CompositeAuditSink, MetricsSink, NoopAuditSink,
    NoopMetricsSink, TelemetryScope,
};
