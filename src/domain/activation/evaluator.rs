//! Activation evaluation - decides whether a registration is live

use chrono::{DateTime, Utc};
use std::fmt;

use crate::domain::registration::Registration;

/// Injectable current-time source, so activation edges are testable without
/// real clocks
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time source
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Predicate gating activation beyond the time window
pub trait ActivationPredicate: Send + Sync + fmt::Debug {
    fn evaluate(&self) -> Result<bool, anyhow::Error>;
}

/// Predicate adapter over a plain closure
pub struct FnPredicate<F>(pub F);

impl<F> fmt::Debug for FnPredicate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPredicate").finish()
    }
}

impl<F> ActivationPredicate for FnPredicate<F>
where
    F: Fn() -> Result<bool, anyhow::Error> + Send + Sync,
{
    fn evaluate(&self) -> Result<bool, anyhow::Error> {
        (self.0)()
    }
}

/// Evaluates whether a registration is currently live
#[derive(Debug, Clone, Copy)]
pub struct ActivationEvaluator;

impl ActivationEvaluator {
    /// Returns true iff `now` is inside the registration's time window and
    /// the activation predicate (if any) evaluates to true.
    ///
    /// A predicate error fails closed: the registration is treated as
    /// inactive and the error is logged, never propagated. Activation must
    /// not itself become a source of cascading failure.
    pub fn is_active(registration: &Registration, now: DateTime<Utc>) -> bool {
        if !registration.is_within_window(now) {
            return false;
        }

        match registration.activation_predicate() {
            None => true,
            Some(predicate) => match predicate.evaluate() {
                Ok(active) => active,
                Err(error) => {
                    tracing::warn!(
                        service_type = %registration.service_type(),
                        %error,
                        "Activation predicate failed, treating registration as inactive"
                    );
                    false
                }
            },
        }
    }
}
