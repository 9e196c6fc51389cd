//! Decorator pipeline - ordered middleware around the terminal call
//!
//! Decorators wrap a `next` continuation, onion-nested: the first registered
//! decorator's before-logic runs first and its after-logic runs last. A
//! fresh chain is built per call from the registration's factories.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Instant;

use super::invocation::InvocationContext;
use crate::domain::error::RouterError;
use crate::domain::telemetry::MetricsSink;

/// The continuation a decorator wraps
pub type InvocationFuture<'a> = BoxFuture<'a, Result<Value, RouterError>>;

/// One middleware layer around an invocation.
///
/// A decorator must propagate errors from `next` unless altering the
/// outcome is explicitly part of its contract.
#[async_trait]
pub trait InvocationDecorator: Send + Sync {
    async fn around(
        &self,
        context: &InvocationContext,
        next: InvocationFuture<'_>,
    ) -> Result<Value, RouterError>;
}

/// Builds a fresh decorator per call
pub trait DecoratorFactory: Send + Sync + Debug {
    fn create(&self) -> Arc<dyn InvocationDecorator>;
}

/// Nest decorators around the terminal invocation.
///
/// An empty chain returns the terminal future unchanged.
pub fn compose<'a>(
    decorators: Vec<Arc<dyn InvocationDecorator>>,
    context: &'a InvocationContext,
    terminal: InvocationFuture<'a>,
) -> InvocationFuture<'a> {
    decorators
        .into_iter()
        .rev()
        .fold(terminal, |next, decorator| {
            Box::pin(async move { decorator.around(context, next).await })
        })
}

// ============================================================================
// Shipped decorators
// ============================================================================

/// Records attempt latency into the registration's metrics sink
pub struct TimingDecorator {
    metrics: Arc<dyn MetricsSink>,
}

#[async_trait]
impl InvocationDecorator for TimingDecorator {
    async fn around(
        &self,
        context: &InvocationContext,
        next: InvocationFuture<'_>,
    ) -> Result<Value, RouterError> {
        let start = Instant::now();
        let result = next.await;

        let outcome = if result.is_ok() { "success" } else { "error" };
        let tags = vec![
            ("service_type".to_string(), context.service_type().to_string()),
            ("trial_key".to_string(), context.trial_key().to_string()),
            ("outcome".to_string(), outcome.to_string()),
        ];
        self.metrics.record_histogram(
            "trial_attempt_duration_seconds",
            start.elapsed().as_secs_f64(),
            &tags,
        );

        result
    }
}

/// Factory for [`TimingDecorator`]
#[derive(Debug)]
pub struct TimingDecoratorFactory {
    metrics: Arc<dyn MetricsSink>,
}

impl TimingDecoratorFactory {
    pub fn new(metrics: Arc<dyn MetricsSink>) -> Self {
        Self { metrics }
    }
}

impl DecoratorFactory for TimingDecoratorFactory {
    fn create(&self) -> Arc<dyn InvocationDecorator> {
        Arc::new(TimingDecorator {
            metrics: self.metrics.clone(),
        })
    }
}

/// Logs attempt failures without suppressing them
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorLoggingDecorator;

#[async_trait]
impl InvocationDecorator for ErrorLoggingDecorator {
    async fn around(
        &self,
        context: &InvocationContext,
        next: InvocationFuture<'_>,
    ) -> Result<Value, RouterError> {
        let result = next.await;

        if let Err(error) = &result {
            tracing::warn!(
                service_type = %context.service_type(),
                method = context.method_name(),
                trial_key = %context.trial_key(),
                %error,
                "Trial attempt failed"
            );
        }

        result
    }
}

/// Factory for [`ErrorLoggingDecorator`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorLoggingDecoratorFactory;

impl DecoratorFactory for ErrorLoggingDecoratorFactory {
    fn create(&self) -> Arc<dyn InvocationDecorator> {
        Arc::new(ErrorLoggingDecorator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registration::{ServiceTypeId, TrialKey};
    use std::sync::Mutex;

    fn context() -> InvocationContext {
        InvocationContext::new(
            ServiceTypeId::new("pricing").unwrap(),
            "score",
            TrialKey::new("treatment").unwrap(),
            vec![],
        )
    }

    struct TraceDecorator {
        name: &'static str,
        trace: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl InvocationDecorator for TraceDecorator {
        async fn around(
            &self,
            _context: &InvocationContext,
            next: InvocationFuture<'_>,
        ) -> Result<Value, RouterError> {
            self.trace.lock().unwrap().push(format!("{}-before", self.name));
            let result = next.await;
            self.trace.lock().unwrap().push(format!("{}-after", self.name));
            result
        }
    }

    #[tokio::test]
    async fn test_onion_nesting_order() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let decorators: Vec<Arc<dyn InvocationDecorator>> = vec![
            Arc::new(TraceDecorator {
                name: "D1",
                trace: trace.clone(),
            }),
            Arc::new(TraceDecorator {
                name: "D2",
                trace: trace.clone(),
            }),
        ];

        let context = context();
        let terminal: InvocationFuture<'_> = Box::pin(async { Ok(serde_json::json!("done")) });
        let result = compose(decorators, &context, terminal).await.unwrap();

        assert_eq!(result, serde_json::json!("done"));
        assert_eq!(
            *trace.lock().unwrap(),
            vec!["D1-before", "D2-before", "D2-after", "D1-after"]
        );
    }

    #[tokio::test]
    async fn test_empty_chain_invokes_terminal_directly() {
        let context = context();
        let terminal: InvocationFuture<'_> = Box::pin(async { Ok(serde_json::json!(7)) });
        let result = compose(Vec::new(), &context, terminal).await.unwrap();
        assert_eq!(result, serde_json::json!(7));
    }

    #[tokio::test]
    async fn test_errors_propagate_through_chain() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let decorators: Vec<Arc<dyn InvocationDecorator>> = vec![
            Arc::new(TraceDecorator {
                name: "D1",
                trace: trace.clone(),
            }),
            Arc::new(ErrorLoggingDecorator),
        ];

        let context = context();
        let terminal: InvocationFuture<'_> = Box::pin(async {
            Err(RouterError::implementation(
                TrialKey::new("treatment").unwrap(),
                anyhow::anyhow!("boom"),
            ))
        });

        let result = compose(decorators, &context, terminal).await;
        assert!(result.is_err());
        // D1 still unwound after the error passed through
        assert_eq!(*trace.lock().unwrap(), vec!["D1-before", "D1-after"]);
    }

    #[tokio::test]
    async fn test_timing_decorator_records_histogram() {
        use crate::domain::telemetry::MetricsSink;

        #[derive(Debug, Default)]
        struct RecordingSink {
            histograms: Mutex<Vec<(String, Vec<(String, String)>)>>,
        }

        impl MetricsSink for RecordingSink {
            fn increment_counter(&self, _name: &str, _tags: &[(String, String)]) {}

            fn record_histogram(&self, name: &str, _value: f64, tags: &[(String, String)]) {
                self.histograms
                    .lock()
                    .unwrap()
                    .push((name.to_string(), tags.to_vec()));
            }

            fn set_gauge(&self, _name: &str, _value: f64, _tags: &[(String, String)]) {}

            fn record_summary(&self, _name: &str, _value: f64, _tags: &[(String, String)]) {}
        }

        let sink = Arc::new(RecordingSink::default());
        let factory = TimingDecoratorFactory::new(sink.clone());

        let context = context();
        let terminal: InvocationFuture<'_> = Box::pin(async { Ok(serde_json::json!(null)) });
        compose(vec![factory.create()], &context, terminal)
            .await
            .unwrap();

        let histograms = sink.histograms.lock().unwrap();
        assert_eq!(histograms.len(), 1);

        let (name, tags) = &histograms[0];
        assert_eq!(name, "trial_attempt_duration_seconds");
        assert!(tags.contains(&("trial_key".to_string(), "treatment".to_string())));
        assert!(tags.contains(&("outcome".to_string(), "success".to_string())));
    }
}
