//! Activation domain module
//!
//! Time-window and predicate gating for registrations. Predicate failures
//! fail closed.

mod evaluator;

pub use evaluator::{
    ActivationEvaluator, ActivationPredicate, Clock, FixedClock, FnPredicate, SystemClock,
};
