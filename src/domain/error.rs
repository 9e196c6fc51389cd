use thiserror::Error;

use crate::domain::registration::{RegistrationValidationError, ServiceTypeId, TrialKey};

/// Call-time routing errors.
///
/// Each caller-facing failure mode is a distinct, catchable variant;
/// per-attempt failures travel through the candidate loop as values and only
/// the terminal outcome is surfaced.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Experiment '{service_type}' is disabled by kill switch")]
    ExperimentDisabled { service_type: ServiceTypeId },

    #[error("Trial '{trial_key}' of '{service_type}' is disabled by kill switch")]
    TrialDisabled {
        service_type: ServiceTypeId,
        trial_key: TrialKey,
    },

    #[error("Circuit breaker for '{service_type}' is open")]
    CircuitOpen { service_type: ServiceTypeId },

    #[error("Trial '{trial_key}' timed out after {timeout_ms}ms")]
    Timeout { trial_key: TrialKey, timeout_ms: u64 },

    #[error("Trial '{trial_key}' failed: {source}")]
    Implementation {
        trial_key: TrialKey,
        #[source]
        source: anyhow::Error,
    },

    #[error("No implementation resolvable for '{service_type}' trial '{trial_key}'")]
    UnresolvableTrial {
        service_type: ServiceTypeId,
        trial_key: TrialKey,
    },

    #[error("No registration found for service type '{service_type}'")]
    UnknownServiceType { service_type: ServiceTypeId },

    #[error("Invalid registration: {0}")]
    Validation(#[from] RegistrationValidationError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RouterError {
    pub fn implementation(trial_key: TrialKey, source: anyhow::Error) -> Self {
        Self::Implementation { trial_key, source }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Short stable label for metrics tags and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ExperimentDisabled { .. } => "experiment_disabled",
            Self::TrialDisabled { .. } => "trial_disabled",
            Self::CircuitOpen { .. } => "circuit_open",
            Self::Timeout { .. } => "timeout",
            Self::Implementation { .. } => "implementation",
            Self::UnresolvableTrial { .. } => "unresolvable_trial",
            Self::UnknownServiceType { .. } => "unknown_service_type",
            Self::Validation(_) => "validation",
            Self::Internal { .. } => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_type() -> ServiceTypeId {
        ServiceTypeId::new("pricing").unwrap()
    }

    fn trial_key() -> TrialKey {
        TrialKey::new("treatment").unwrap()
    }

    #[test]
    fn test_experiment_disabled_display() {
        let error = RouterError::ExperimentDisabled {
            service_type: service_type(),
        };
        assert_eq!(
            error.to_string(),
            "Experiment 'pricing' is disabled by kill switch"
        );
        assert_eq!(error.kind(), "experiment_disabled");
    }

    #[test]
    fn test_timeout_display() {
        let error = RouterError::Timeout {
            trial_key: trial_key(),
            timeout_ms: 250,
        };
        assert_eq!(error.to_string(), "Trial 'treatment' timed out after 250ms");
        assert_eq!(error.kind(), "timeout");
    }

    #[test]
    fn test_implementation_preserves_cause() {
        let error = RouterError::implementation(trial_key(), anyhow::anyhow!("backend exploded"));
        assert!(error.to_string().contains("backend exploded"));
        assert_eq!(error.kind(), "implementation");
    }

    #[test]
    fn test_validation_conversion() {
        let error: RouterError = RegistrationValidationError::NoTrials.into();
        assert_eq!(error.kind(), "validation");
    }
}
