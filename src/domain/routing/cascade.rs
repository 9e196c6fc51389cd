//! Error-policy cascade - expands a preferred key into ordered candidates

use crate::domain::registration::{ErrorPolicy, Registration, TrialKey};

/// Ordered, duplicate-free candidate keys for one call.
///
/// Always starts with the preferred key and is never empty. A key appearing
/// both as preferred and in a fallback position is kept only once, in its
/// earliest position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateList(Vec<TrialKey>);

impl CandidateList {
    /// Get the candidates in attempt order
    pub fn keys(&self) -> &[TrialKey] {
        &self.0
    }

    /// Get the preferred (first) key
    pub fn preferred(&self) -> &TrialKey {
        &self.0[0]
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A candidate list is never empty by construction
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate candidates in attempt order
    pub fn iter(&self) -> std::slice::Iter<'_, TrialKey> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a TrialKey;
    type IntoIter = std::slice::Iter<'a, TrialKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Expand the preferred key into the ordered candidate list under the
/// registration's error policy.
///
/// Pure function of policy and registration, no I/O. Candidate keys that
/// are not declared trials are kept: they resolve to the default
/// implementation at attempt time rather than failing the lookup.
pub fn build_candidates(preferred: &TrialKey, registration: &Registration) -> CandidateList {
    let mut candidates = vec![preferred.clone()];

    match registration.error_policy() {
        ErrorPolicy::Throw => {}
        ErrorPolicy::RedirectDefault => {
            push_unique(&mut candidates, registration.default_key());
        }
        ErrorPolicy::RedirectAny => {
            for key in registration.sorted_trial_keys() {
                push_unique(&mut candidates, &key);
            }
        }
        ErrorPolicy::RedirectSpecific { fallback } => {
            push_unique(&mut candidates, fallback);
        }
        ErrorPolicy::RedirectOrdered { keys } => {
            for key in keys {
                push_unique(&mut candidates, key);
            }
        }
    }

    CandidateList(candidates)
}

fn push_unique(candidates: &mut Vec<TrialKey>, key: &TrialKey) {
    if !candidates.contains(key) {
        candidates.push(key.clone());
    }
}
