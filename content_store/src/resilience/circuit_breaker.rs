//! Count-based circuit breaker.
//!
//! CLOSED records outcomes in a sliding window of the last N calls and opens
//! once at least `minimum_number_of_calls` outcomes are known and the failure
//! rate reaches the threshold. OPEN rejects every call until the cooldown
//! elapses; the first call after that moves the breaker to HALF_OPEN, which
//! admits a fixed number of trial calls. A trial failure reopens the
//! circuit, enough trial successes close it.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use opentelemetry::KeyValue;
use strum::{AsRefStr, Display};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::{config::CircuitBreakerConfig, metrics::ContentMetrics, ContentResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
}

/// Returned by [`CircuitBreaker::try_acquire`] when no call is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallNotPermitted;

struct BreakerState {
    state: CircuitState,
    // Bumped on every transition; permits from an older generation are ignored.
    generation: u64,
    window: VecDeque<Outcome>,
    opened_at: Option<Instant>,
    half_open_in_flight: usize,
    half_open_successes: usize,
}

pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
    metrics: Option<ContentMetrics>,
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let window = VecDeque::with_capacity(config.sliding_window_size);
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                generation: 0,
                window,
                opened_at: None,
                half_open_in_flight: 0,
                half_open_successes: 0,
            }),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: ContentMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Failure percentage over the current window, `None` until the minimum
    /// number of calls has been recorded.
    pub fn failure_rate(&self) -> Option<f32> {
        let inner = self.lock();
        self.evaluate(&inner.window)
    }

    /// Ask for permission to call the backend.
    pub fn try_acquire(self: &Arc<Self>) -> Result<CallPermit, CallNotPermitted> {
        let mut inner = self.lock();

        if inner.state == CircuitState::Open {
            let cooled_down = inner
                .opened_at
                .is_some_and(|at| at.elapsed() >= self.config.wait_duration_in_open_state());
            if !cooled_down {
                return Err(CallNotPermitted);
            }
            self.transition(&mut inner, CircuitState::HalfOpen);
        }

        let half_open = inner.state == CircuitState::HalfOpen;
        if half_open {
            let admitted = inner.half_open_in_flight + inner.half_open_successes;
            if admitted >= self.config.permitted_calls_in_half_open_state {
                return Err(CallNotPermitted);
            }
            inner.half_open_in_flight += 1;
        }

        Ok(CallPermit {
            breaker: Arc::clone(self),
            generation: inner.generation,
            half_open,
            settled: false,
        })
    }

    fn on_result(&self, generation: u64, half_open: bool, outcome: Outcome) {
        let mut inner = self.lock();
        if inner.generation != generation {
            return;
        }

        match inner.state {
            CircuitState::Closed => {
                inner.window.push_back(outcome);
                while inner.window.len() > self.config.sliding_window_size {
                    inner.window.pop_front();
                }
                if let Some(rate) = self.evaluate(&inner.window) {
                    if rate >= self.config.failure_rate_threshold {
                        warn!(
                            breaker = %self.name,
                            failure_rate = rate,
                            threshold = self.config.failure_rate_threshold,
                            "failure rate threshold reached"
                        );
                        self.transition(&mut inner, CircuitState::Open);
                    }
                }
            }
            CircuitState::HalfOpen if half_open => {
                inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
                match outcome {
                    Outcome::Failure => self.transition(&mut inner, CircuitState::Open),
                    Outcome::Success => {
                        inner.half_open_successes += 1;
                        if inner.half_open_successes
                            >= self.config.permitted_calls_in_half_open_state
                        {
                            self.transition(&mut inner, CircuitState::Closed);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn release(&self, generation: u64, half_open: bool) {
        let mut inner = self.lock();
        if half_open && inner.generation == generation {
            inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
        }
    }

    fn evaluate(&self, window: &VecDeque<Outcome>) -> Option<f32> {
        if window.is_empty() || window.len() < self.config.minimum_number_of_calls {
            return None;
        }
        let failures = window.iter().filter(|o| **o == Outcome::Failure).count();
        Some(failures as f32 * 100.0 / window.len() as f32)
    }

    fn transition(&self, inner: &mut BreakerState, to: CircuitState) {
        let from = inner.state;
        inner.state = to;
        inner.generation += 1;
        inner.window.clear();
        inner.half_open_in_flight = 0;
        inner.half_open_successes = 0;
        inner.opened_at = (to == CircuitState::Open).then(Instant::now);

        info!(
            breaker = %self.name,
            from = %from,
            to = %to,
            "circuit breaker state transition"
        );
        if let Some(metrics) = &self.metrics {
            metrics
                .circuit_transitions
                .add(1, &[KeyValue::new("state", to.as_ref().to_string())]);
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Permission for one backend call. Settle it with the call's outcome; a
/// permit dropped unsettled (cancelled call) only frees its trial slot.
#[must_use]
pub struct CallPermit {
    breaker: Arc<CircuitBreaker>,
    generation: u64,
    half_open: bool,
    settled: bool,
}

impl CallPermit {
    pub fn record_success(mut self) {
        self.settle(Outcome::Success);
    }

    pub fn record_failure(mut self) {
        self.settle(Outcome::Failure);
    }

    /// Transient errors count as failures, everything else as a completed
    /// round trip.
    pub fn record<T>(self, result: &ContentResult<T>) {
        match result {
            Err(err) if err.is_transient() => self.record_failure(),
            _ => self.record_success(),
        }
    }

    fn settle(&mut self, outcome: Outcome) {
        self.settled = true;
        self.breaker
            .on_result(self.generation, self.half_open, outcome);
    }
}

impl Drop for CallPermit {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.release(self.generation, self.half_open);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn breaker() -> Arc<CircuitBreaker> {
        Arc::new(CircuitBreaker::new(
            "test",
            CircuitBreakerConfig::default(),
        ))
    }

    fn fail(breaker: &Arc<CircuitBreaker>, n: usize) {
        for _ in 0..n {
            breaker.try_acquire().unwrap().record_failure();
        }
    }

    fn succeed(breaker: &Arc<CircuitBreaker>, n: usize) {
        for _ in 0..n {
            breaker.try_acquire().unwrap().record_success();
        }
    }

    #[test]
    fn test_stays_closed_below_minimum_calls() {
        let breaker = breaker();
        fail(&breaker, 4);
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.failure_rate(), None);
    }

    #[test]
    fn test_opens_at_threshold() {
        let breaker = breaker();
        succeed(&breaker, 3);
        fail(&breaker, 2);
        // 2 of 5 = 40%
        assert_eq!(breaker.state(), CircuitState::Closed);
        fail(&breaker, 1);
        // 3 of 6 = 50%
        assert_eq!(breaker.state(), CircuitState::Open);
        assert_eq!(breaker.try_acquire().err(), Some(CallNotPermitted));
    }

    #[test]
    fn test_window_slides() {
        let breaker = breaker();
        fail(&breaker, 4);
        succeed(&breaker, 1);
        // 4 of 5 failed, opens immediately
        assert_eq!(breaker.state(), CircuitState::Open);

        let breaker = self::breaker();
        fail(&breaker, 2);
        succeed(&breaker, 10);
        // the two failures slid out of the window
        assert_eq!(breaker.failure_rate(), Some(0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_after_cooldown_then_closes() {
        let breaker = breaker();
        fail(&breaker, 5);
        assert_eq!(breaker.state(), CircuitState::Open);

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(breaker.try_acquire().is_err());

        tokio::time::advance(Duration::from_secs(1)).await;
        let first = breaker.try_acquire().unwrap();
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        let second = breaker.try_acquire().unwrap();
        let third = breaker.try_acquire().unwrap();
        // only three trial calls
        assert!(breaker.try_acquire().is_err());

        first.record_success();
        second.record_success();
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        third.record_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_failure_reopens() {
        let breaker = breaker();
        fail(&breaker, 5);
        tokio::time::advance(Duration::from_secs(30)).await;

        breaker.try_acquire().unwrap().record_failure();
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(breaker.try_acquire().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_permit_frees_trial_slot() {
        let config = CircuitBreakerConfig {
            permitted_calls_in_half_open_state: 1,
            ..Default::default()
        };
        let breaker = Arc::new(CircuitBreaker::new("test", config));
        fail(&breaker, 5);
        tokio::time::advance(Duration::from_secs(30)).await;

        let permit = breaker.try_acquire().unwrap();
        assert!(breaker.try_acquire().is_err());
        drop(permit);
        breaker.try_acquire().unwrap().record_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[test]
    fn test_stale_permit_is_ignored() {
        let breaker = breaker();
        let stale = breaker.try_acquire().unwrap();
        fail(&breaker, 5);
        assert_eq!(breaker.state(), CircuitState::Open);
        stale.record_success();
        assert_eq!(breaker.state(), CircuitState::Open);
    }
}
