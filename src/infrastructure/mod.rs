//! Infrastructure layer - Concrete adapters over the domain seams

pub mod observability;
pub mod registry;
pub mod selection;

pub use observability::{
    init_metrics, init_tracing, LogFormat, LoggingConfig, MetricsConfig, ObservabilityConfig,
    PrometheusMetrics, RecorderMetricsSink,
};
pub use registry::{InMemoryRegistrationRegistry, RoutingService};
pub use selection::{InMemoryConfigSource, InMemoryFlagSource};
