//! Resilience domain module
//!
//! Shared, synchronized state guarding candidate attempts: the
//! per-registration circuit breaker and the externally controlled kill
//! switch. Both are owned as explicit `Arc`s by the registration rather
//! than hidden process globals, so tests construct isolated instances.

mod circuit_breaker;
mod kill_switch;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerOptions, CircuitState, OnCircuitOpen};
pub use kill_switch::KillSwitch;
