//! Invocation contracts - per-attempt context, request shape, and the
//! implementation resolver seam

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

use crate::domain::error::RouterError;
use crate::domain::registration::{ServiceTypeId, TrialKey};

/// One attempt's view of a call.
///
/// Passed unchanged through the decorator chain; decorators may read it but
/// its identity is never mutated mid-call.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    service_type: ServiceTypeId,
    method_name: String,
    trial_key: TrialKey,
    arguments: Vec<Value>,
}

impl InvocationContext {
    /// Create a context for one candidate attempt
    pub fn new(
        service_type: ServiceTypeId,
        method_name: impl Into<String>,
        trial_key: TrialKey,
        arguments: Vec<Value>,
    ) -> Self {
        Self {
            service_type,
            method_name: method_name.into(),
            trial_key,
            arguments,
        }
    }

    /// Get the service type being routed
    pub fn service_type(&self) -> &ServiceTypeId {
        &self.service_type
    }

    /// Get the invoked method name
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Get the trial key being attempted
    pub fn trial_key(&self) -> &TrialKey {
        &self.trial_key
    }

    /// Get the ordered argument values
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }
}

/// A routed call as the caller hands it to the router
#[derive(Debug, Clone, Default)]
pub struct RouteRequest {
    method_name: String,
    arguments: Vec<Value>,
    identity: Option<String>,
}

impl RouteRequest {
    /// Create a request for a method with no arguments
    pub fn new(method_name: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            arguments: Vec::new(),
            identity: None,
        }
    }

    /// Append an argument value
    pub fn with_argument(mut self, argument: Value) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Set all argument values
    pub fn with_arguments(mut self, arguments: Vec<Value>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Attach the caller identity used for sticky routing
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Get the method name
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Get the ordered argument values
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// Get the caller identity, if any
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

/// A concrete trial implementation instance.
///
/// Failures surface as `anyhow::Error` so implementations keep their own
/// error types; the router wraps them into `RouterError::Implementation`
/// preserving the cause.
#[async_trait]
pub trait TrialImplementation: Send + Sync {
    async fn invoke(&self, context: &InvocationContext) -> Result<Value, anyhow::Error>;
}

/// Resolves `(service type, trial key)` to an implementation instance.
///
/// This replaces proxy construction: the router never synthesizes types, it
/// only asks this capability for an instance to call. Resolution of a key
/// the resolver does not know must fail loudly.
#[async_trait]
pub trait ImplementationResolver: Send + Sync + Debug {
    async fn resolve(
        &self,
        service_type: &ServiceTypeId,
        trial_key: &TrialKey,
    ) -> Result<Arc<dyn TrialImplementation>, RouterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_request_builder() {
        let request = RouteRequest::new("score")
            .with_argument(serde_json::json!({"basket": 3}))
            .with_argument(serde_json::json!(42))
            .with_identity("user-42");

        assert_eq!(request.method_name(), "score");
        assert_eq!(request.arguments().len(), 2);
        assert_eq!(request.identity(), Some("user-42"));
    }

    #[test]
    fn test_invocation_context_accessors() {
        let context = InvocationContext::new(
            ServiceTypeId::new("pricing").unwrap(),
            "score",
            TrialKey::new("treatment").unwrap(),
            vec![serde_json::json!(1)],
        );

        assert_eq!(context.service_type().as_str(), "pricing");
        assert_eq!(context.method_name(), "score");
        assert_eq!(context.trial_key().as_str(), "treatment");
        assert_eq!(context.arguments(), &[serde_json::json!(1)]);
    }
}
