//! Pre-flight conflict detection over registration sets

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

use crate::domain::registration::{ErrorPolicy, Registration, ServiceTypeId, TrialKey};

/// One conflict found in a registration set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// An error policy references a fallback key that is not a declared
    /// trial
    InvalidFallbackKey {
        service_type: ServiceTypeId,
        key: TrialKey,
    },
    /// Two registrations for the same service type, both unbounded in time
    DuplicateServiceRegistration { service_type: ServiceTypeId },
    /// Two registrations for the same service type with overlapping time
    /// windows
    OverlappingTimeWindows { service_type: ServiceTypeId },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFallbackKey { service_type, key } => write!(
                f,
                "'{service_type}': error policy references unknown fallback key '{key}'"
            ),
            Self::DuplicateServiceRegistration { service_type } => {
                write!(f, "'{service_type}': duplicate unbounded registration")
            }
            Self::OverlappingTimeWindows { service_type } => {
                write!(f, "'{service_type}': registrations with overlapping time windows")
            }
        }
    }
}

/// Aggregate error raised when a registration set has conflicts
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Registration set has {} conflict(s): {}", .conflicts.len(), format_conflicts(.conflicts))]
pub struct ConflictError {
    pub conflicts: Vec<Conflict>,
}

fn format_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(Conflict::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Static validation over an entire set of registrations.
///
/// Runs before any call is served; configuration defects found here are
/// fatal.
#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector;

impl ConflictDetector {
    /// Collect every conflict in the set; never fail-fast
    pub fn detect(registrations: &[Registration]) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        for registration in registrations {
            Self::check_fallback_keys(registration, &mut conflicts);
        }

        for (index, first) in registrations.iter().enumerate() {
            for second in &registrations[index + 1..] {
                if first.service_type() != second.service_type() {
                    continue;
                }

                let first_unbounded =
                    first.start_time().is_none() && first.end_time().is_none();
                let second_unbounded =
                    second.start_time().is_none() && second.end_time().is_none();

                if first_unbounded && second_unbounded {
                    conflicts.push(Conflict::DuplicateServiceRegistration {
                        service_type: first.service_type().clone(),
                    });
                } else if windows_overlap(first, second) {
                    conflicts.push(Conflict::OverlappingTimeWindows {
                        service_type: first.service_type().clone(),
                    });
                }
            }
        }

        conflicts
    }

    /// Raise an aggregate error if the set has any conflict
    pub fn validate_or_throw(registrations: &[Registration]) -> Result<(), ConflictError> {
        let conflicts = Self::detect(registrations);

        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(ConflictError { conflicts })
        }
    }

    fn check_fallback_keys(registration: &Registration, conflicts: &mut Vec<Conflict>) {
        match registration.error_policy() {
            ErrorPolicy::Throw | ErrorPolicy::RedirectDefault | ErrorPolicy::RedirectAny => {}
            ErrorPolicy::RedirectSpecific { fallback } => {
                if !registration.has_trial(fallback) {
                    conflicts.push(Conflict::InvalidFallbackKey {
                        service_type: registration.service_type().clone(),
                        key: fallback.clone(),
                    });
                }
            }
            ErrorPolicy::RedirectOrdered { keys } => {
                for key in keys {
                    if !registration.has_trial(key) {
                        conflicts.push(Conflict::InvalidFallbackKey {
                            service_type: registration.service_type().clone(),
                            key: key.clone(),
                        });
                    }
                }
            }
        }
    }
}

fn windows_overlap(first: &Registration, second: &Registration) -> bool {
    let first_start = first.start_time().unwrap_or(DateTime::<Utc>::MIN_UTC);
    let first_end = first.end_time().unwrap_or(DateTime::<Utc>::MAX_UTC);
    let second_start = second.start_time().unwrap_or(DateTime::<Utc>::MIN_UTC);
    let second_end = second.end_time().unwrap_or(DateTime::<Utc>::MAX_UTC);

    // Activation bounds are inclusive, so touching windows overlap
    first_start <= second_end && second_start <= first_end
}
