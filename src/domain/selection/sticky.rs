//! Sticky routing - deterministic, identity-based trial assignment
//!
//! Ensures the same identity always gets assigned to the same trial for a
//! given experiment, while different experiments hash independently.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

use super::context::SelectionContext;
use super::provider::SelectionProvider;
use crate::domain::registration::{RegistrationValidationError, TrialKey};

/// Deterministic, distribution-preserving hash assignment
#[derive(Debug, Clone, Copy)]
pub struct StickyRouter;

impl StickyRouter {
    /// Assign a trial key for an identity within an experiment.
    ///
    /// The assignment is stable for a given `(identity, experiment_name,
    /// trial_keys)` triple, and the experiment name participates in the hash
    /// so the same identity may land on different trials across experiments.
    /// Keys are reduced against a sorted list, keeping the assignment
    /// independent of map iteration order.
    ///
    /// Zero trial keys is a configuration defect and fails loudly.
    pub fn select_trial(
        identity: &str,
        experiment_name: &str,
        trial_keys: &[TrialKey],
    ) -> Result<TrialKey, RegistrationValidationError> {
        match trial_keys {
            [] => Err(RegistrationValidationError::NoTrialKeysForSticky),
            [only] => Ok(only.clone()),
            keys => {
                let mut sorted: Vec<&TrialKey> = keys.iter().collect();
                sorted.sort();

                let mut hasher = DefaultHasher::new();
                hasher.write(identity.as_bytes());
                hasher.write_u8(0x01);
                hasher.write(experiment_name.as_bytes());

                let bucket = (hasher.finish() % sorted.len() as u64) as usize;
                Ok(sorted[bucket].clone())
            }
        }
    }
}

/// Selection provider delegating to the sticky router.
///
/// A call without an identity has no stable assignment basis and yields no
/// preference.
#[derive(Debug, Clone, Copy, Default)]
pub struct StickyProvider;

impl StickyProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SelectionProvider for StickyProvider {
    async fn select_trial_key(
        &self,
        context: &SelectionContext,
    ) -> Result<Option<TrialKey>, anyhow::Error> {
        let Some(identity) = context.identity() else {
            return Ok(None);
        };

        let key =
            StickyRouter::select_trial(identity, context.selector_name(), context.trial_keys())?;
        Ok(Some(key))
    }
}
