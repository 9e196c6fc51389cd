//! Per-registration circuit breaker
//!
//! Closed -> Open on a sliding-window failure ratio crossing the configured
//! threshold with a minimum-throughput floor; Open -> HalfOpen after the
//! break duration; a single half-open probe decides the next transition.

use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Behavior of candidate attempts while the circuit is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnCircuitOpen {
    /// Fail the whole call with a circuit-open error
    #[default]
    Throw,
    /// Treat the rejected candidate as a normal failure and continue the
    /// cascade
    TreatAsFailure,
}

/// Circuit breaker configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CircuitBreakerOptions {
    /// Failure ratio (0.0 to 1.0) at which the circuit opens
    #[serde(default = "default_failure_ratio")]
    pub failure_ratio: f64,
    /// Length of the sliding sampling window in milliseconds
    #[serde(default = "default_sampling_window_ms")]
    pub sampling_window_ms: u64,
    /// Minimum samples inside the window before the ratio is considered
    #[serde(default = "default_minimum_throughput")]
    pub minimum_throughput: u32,
    /// How long the circuit stays open before allowing a probe
    #[serde(default = "default_break_duration_ms")]
    pub break_duration_ms: u64,
    /// What open-circuit rejection does to the surrounding call
    #[serde(default)]
    pub on_open: OnCircuitOpen,
}

fn default_failure_ratio() -> f64 {
    0.5
}

fn default_sampling_window_ms() -> u64 {
    30_000
}

fn default_minimum_throughput() -> u32 {
    10
}

fn default_break_duration_ms() -> u64 {
    30_000
}

impl Default for CircuitBreakerOptions {
    fn default() -> Self {
        Self {
            failure_ratio: default_failure_ratio(),
            sampling_window_ms: default_sampling_window_ms(),
            minimum_throughput: default_minimum_throughput(),
            break_duration_ms: default_break_duration_ms(),
            on_open: OnCircuitOpen::default(),
        }
    }
}

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct Sample {
    recorded_at: Instant,
    failed: bool,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    samples: VecDeque<Sample>,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

/// One circuit breaker per registration, shared by every concurrent call.
///
/// Created at registration build time and lives for the process.
#[derive(Debug)]
pub struct CircuitBreaker {
    options: CircuitBreakerOptions,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a closed breaker
    pub fn new(options: CircuitBreakerOptions) -> Self {
        Self {
            options,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                samples: VecDeque::new(),
                opened_at: None,
                probe_in_flight: false,
            }),
        }
    }

    /// Get the configured options
    pub fn options(&self) -> &CircuitBreakerOptions {
        &self.options
    }

    /// Current state, advancing Open to HalfOpen once the break duration has
    /// elapsed
    pub fn state(&self) -> CircuitState {
        let mut inner = self.lock();
        self.advance(&mut inner);
        inner.state
    }

    /// Ask permission for one attempt.
    ///
    /// Returns false while Open, and for all but the single probe while
    /// HalfOpen. Callers that were granted an attempt must report its outcome
    /// through `record_success`/`record_failure`.
    pub fn try_acquire(&self) -> bool {
        let mut inner = self.lock();
        self.advance(&mut inner);

        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => {
                if inner.probe_in_flight {
                    false
                } else {
                    inner.probe_in_flight = true;
                    true
                }
            }
        }
    }

    /// Record a successful attempt
    pub fn record_success(&self) {
        let mut inner = self.lock();

        if inner.state == CircuitState::HalfOpen {
            tracing::info!("Circuit breaker probe succeeded, closing circuit");
            inner.state = CircuitState::Closed;
            inner.samples.clear();
            inner.opened_at = None;
            inner.probe_in_flight = false;
            return;
        }

        self.push_sample(&mut inner, false);
    }

    /// Record a failed attempt
    pub fn record_failure(&self) {
        let mut inner = self.lock();

        if inner.state == CircuitState::HalfOpen {
            tracing::warn!("Circuit breaker probe failed, reopening circuit");
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            inner.probe_in_flight = false;
            return;
        }

        self.push_sample(&mut inner, true);

        let window_len = inner.samples.len() as u32;

        if window_len < self.options.minimum_throughput {
            return;
        }

        let failures = inner.samples.iter().filter(|s| s.failed).count() as f64;
        let ratio = failures / window_len as f64;

        if ratio >= self.options.failure_ratio {
            tracing::warn!(
                failure_ratio = ratio,
                window = window_len,
                "Failure ratio over threshold, opening circuit"
            );
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            inner.samples.clear();
        }
    }

    fn advance(&self, inner: &mut BreakerInner) {
        if inner.state != CircuitState::Open {
            return;
        }

        let break_duration = Duration::from_millis(self.options.break_duration_ms);
        let elapsed = inner.opened_at.map(|at| at.elapsed()).unwrap_or_default();

        if elapsed >= break_duration {
            inner.state = CircuitState::HalfOpen;
            inner.probe_in_flight = false;
        }
    }

    fn push_sample(&self, inner: &mut BreakerInner, failed: bool) {
        let window = Duration::from_millis(self.options.sampling_window_ms);
        let now = Instant::now();

        inner.samples.push_back(Sample {
            recorded_at: now,
            failed,
        });

        while let Some(front) = inner.samples.front() {
            if now.duration_since(front.recorded_at) > window {
                inner.samples.pop_front();
            } else {
                break;
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerInner> {
        // A poisoned lock only means some recorder panicked; the window data
        // itself remains usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(minimum_throughput: u32, break_duration_ms: u64) -> CircuitBreakerOptions {
        CircuitBreakerOptions {
            failure_ratio: 0.5,
            sampling_window_ms: 60_000,
            minimum_throughput,
            break_duration_ms,
            on_open: OnCircuitOpen::Throw,
        }
    }

    #[test]
    fn test_starts_closed() {
        let breaker = CircuitBreaker::new(CircuitBreakerOptions::default());
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert!(breaker.try_acquire());
    }

    #[test]
    fn test_does_not_open_below_minimum_throughput() {
        let breaker = CircuitBreaker::new(options(10, 60_000));

        for _ in 0..9 {
            breaker.record_failure();
        }

        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[test]
    fn test_opens_on_ratio_over_threshold() {
        let breaker = CircuitBreaker::new(options(4, 60_000));

        breaker.record_success();
        breaker.record_failure();
        breaker.record_failure();
        breaker.record_failure();

        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.try_acquire());
    }

    #[test]
    fn test_stays_closed_under_ratio() {
        let breaker = CircuitBreaker::new(options(4, 60_000));

        breaker.record_success();
        breaker.record_success();
        breaker.record_success();
        breaker.record_failure();

        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_after_break_duration() {
        let breaker = CircuitBreaker::new(options(2, 20));

        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);

        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
    }

    #[test]
    fn test_half_open_allows_single_probe() {
        let breaker = CircuitBreaker::new(options(2, 20));

        breaker.record_failure();
        breaker.record_failure();
        std::thread::sleep(Duration::from_millis(30));

        assert!(breaker.try_acquire());
        assert!(!breaker.try_acquire());
    }

    #[test]
    fn test_successful_probe_closes_circuit() {
        let breaker = CircuitBreaker::new(options(2, 20));

        breaker.record_failure();
        breaker.record_failure();
        std::thread::sleep(Duration::from_millis(30));

        assert!(breaker.try_acquire());
        breaker.record_success();

        assert_eq!(breaker.state(), CircuitState::Closed);
        assert!(breaker.try_acquire());
    }

    #[test]
    fn test_failed_probe_reopens_circuit() {
        let breaker = CircuitBreaker::new(options(2, 20));

        breaker.record_failure();
        breaker.record_failure();
        std::thread::sleep(Duration::from_millis(30));

        assert!(breaker.try_acquire());
        breaker.record_failure();

        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.try_acquire());
    }

    #[test]
    fn test_options_deserialization_defaults() {
        let options: CircuitBreakerOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, CircuitBreakerOptions::default());

        let options: CircuitBreakerOptions =
            serde_json::from_str("{\"failure_ratio\":0.25,\"on_open\":\"treat_as_failure\"}")
                .unwrap();
        assert_eq!(options.failure_ratio, 0.25);
        assert_eq!(options.on_open, OnCircuitOpen::TreatAsFailure);
    }
}
