//! Out-of-band kill switch for experiments and individual trials
//!
//! Two independent sets: disabled service types (the whole experiment) and
//! disabled `(service type, trial key)` pairs. Writes come from operators or
//! control planes outside the engine; the routing hot path only reads.
//! Last-write-wins, no transactional guarantees.

use dashmap::DashSet;

use crate::domain::registration::{ServiceTypeId, TrialKey};

/// Operator-controlled kill switch.
///
/// Backed by lock-free `DashSet`s so the per-call read path is
/// contention-free. Writes (disable/enable) are rare.
#[derive(Debug, Default)]
pub struct KillSwitch {
    disabled_experiments: DashSet<ServiceTypeId>,
    disabled_trials: DashSet<(ServiceTypeId, TrialKey)>,
}

impl KillSwitch {
    /// Create a kill switch with nothing disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable a whole experiment. Idempotent.
    pub fn disable_experiment(&self, service_type: ServiceTypeId) {
        if self.disabled_experiments.insert(service_type.clone()) {
            tracing::warn!(service_type = %service_type, "Kill switch engaged: experiment disabled");
        }
    }

    /// Re-enable a whole experiment. Idempotent.
    pub fn enable_experiment(&self, service_type: &ServiceTypeId) {
        if self.disabled_experiments.remove(service_type).is_some() {
            tracing::info!(service_type = %service_type, "Kill switch released: experiment enabled");
        }
    }

    /// Disable a single trial of an experiment. Idempotent.
    pub fn disable_trial(&self, service_type: ServiceTypeId, trial_key: TrialKey) {
        if self
            .disabled_trials
            .insert((service_type.clone(), trial_key.clone()))
        {
            tracing::warn!(
                service_type = %service_type,
                trial_key = %trial_key,
                "Kill switch engaged: trial disabled"
            );
        }
    }

    /// Re-enable a single trial. Idempotent.
    pub fn enable_trial(&self, service_type: &ServiceTypeId, trial_key: &TrialKey) {
        if self
            .disabled_trials
            .remove(&(service_type.clone(), trial_key.clone()))
            .is_some()
        {
            tracing::info!(
                service_type = %service_type,
                trial_key = %trial_key,
                "Kill switch released: trial enabled"
            );
        }
    }

    /// Returns true when the whole experiment is disabled
    #[inline]
    pub fn is_experiment_disabled(&self, service_type: &ServiceTypeId) -> bool {
        self.disabled_experiments.contains(service_type)
    }

    /// Returns true when one specific trial is disabled
    #[inline]
    pub fn is_trial_disabled(&self, service_type: &ServiceTypeId, trial_key: &TrialKey) -> bool {
        self.disabled_trials
            .contains(&(service_type.clone(), trial_key.clone()))
    }
}
