//! Registration domain module
//!
//! A registration declares, for one service type, the set of candidate
//! trial implementations, how the preferred one is selected per call, and
//! the resilience policies applied around each attempt.

mod builder;
mod entity;
mod validation;

pub use builder::RegistrationBuilder;
pub use entity::{
    ErrorPolicy, Registration, SelectionMode, ServiceTypeId, TimeoutAction, TimeoutOptions, Trial,
    TrialKey,
};
pub use validation::{
    validate_service_type_id, validate_trial_key, RegistrationValidationError,
};
