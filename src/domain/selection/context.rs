//! Per-call selection context

use crate::domain::registration::{Registration, ServiceTypeId, TrialKey};

/// Everything a selection provider may look at for one call.
///
/// Constructed fresh per call from the registration plus per-call scoped
/// data (the caller identity), and immutable once built.
#[derive(Debug, Clone)]
pub struct SelectionContext {
    service_type: ServiceTypeId,
    selector_name: String,
    default_key: TrialKey,
    trial_keys: Vec<TrialKey>,
    identity: Option<String>,
}

impl SelectionContext {
    /// Build the context for one call
    pub fn for_call(registration: &Registration, identity: Option<String>) -> Self {
        Self {
            service_type: registration.service_type().clone(),
            selector_name: registration.selector_name().to_string(),
            default_key: registration.default_key().clone(),
            trial_keys: registration.sorted_trial_keys(),
            identity,
        }
    }

    /// Get the service type being routed
    pub fn service_type(&self) -> &ServiceTypeId {
        &self.service_type
    }

    /// Get the selector name providers query their backend with
    pub fn selector_name(&self) -> &str {
        &self.selector_name
    }

    /// Get the registration's default trial key
    pub fn default_key(&self) -> &TrialKey {
        &self.default_key
    }

    /// Get the declared trial keys, sorted
    pub fn trial_keys(&self) -> &[TrialKey] {
        &self.trial_keys
    }

    /// Get the caller identity for sticky routing, if the call carried one
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registration::Trial;

    #[test]
    fn test_context_snapshots_registration() {
        let control = TrialKey::new("control").unwrap();
        let treatment = TrialKey::new("treatment").unwrap();

        let registration = Registration::builder(ServiceTypeId::new("pricing").unwrap())
            .trial(Trial::new(treatment.clone(), "Treatment"))
            .trial(Trial::new(control.clone(), "Control"))
            .default_key(control.clone())
            .selector_name("pricing-rollout")
            .build()
            .unwrap();

        let context = SelectionContext::for_call(&registration, Some("user-42".to_string()));

        assert_eq!(context.service_type().as_str(), "pricing");
        assert_eq!(context.selector_name(), "pricing-rollout");
        assert_eq!(context.default_key(), &control);
        // Keys are sorted independent of declaration order
        assert_eq!(context.trial_keys(), &[control, treatment]);
        assert_eq!(context.identity(), Some("user-42"));
    }
}
