//! Circuit breaker, retry and timeout policies around backend calls.
//!
//! Retry wraps the breaker: every attempt asks the breaker for a permit, so
//! an open circuit fails the call fast and is never retried.

mod circuit_breaker;
mod retry;

use std::{future::Future, sync::Arc, time::Duration};

pub use circuit_breaker::{CallNotPermitted, CallPermit, CircuitBreaker, CircuitState};
pub use retry::RetryPolicy;
use tracing::{debug, error, warn};

use crate::{config::ContentStoreConfig, metrics::ContentMetrics, ContentError, ContentResult};

const BREAKER_NAME: &str = "azureBlobStorage";

/// Shared policy state for one backend. Cheap to clone; clones share the
/// same breaker.
#[derive(Debug, Clone)]
pub struct Resilience {
    breaker: Arc<CircuitBreaker>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl Resilience {
    pub fn new(breaker: Arc<CircuitBreaker>, retry: RetryPolicy, timeout: Duration) -> Self {
        Self {
            breaker,
            retry,
            timeout,
        }
    }

    pub fn from_config(config: &ContentStoreConfig, metrics: Option<ContentMetrics>) -> Self {
        let mut breaker = CircuitBreaker::new(BREAKER_NAME, config.circuit_breaker.clone());
        if let Some(metrics) = metrics {
            breaker = breaker.with_metrics(metrics);
        }
        Self::new(
            Arc::new(breaker),
            RetryPolicy::from_config(config),
            config.timeout(),
        )
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `operation` under retry, breaker and per-attempt timeout. The
    /// last error is returned once attempts run out.
    pub async fn call<T, F, Fut>(
        &self,
        op: &'static str,
        location: &str,
        operation: F,
    ) -> ContentResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ContentResult<T>>,
    {
        self.retrying(op, location, Some(self.timeout), operation).await
    }

    /// Like [`Resilience::call`] with an explicit per-attempt limit, for
    /// requests whose transfer time grows with the payload.
    pub async fn call_with_timeout<T, F, Fut>(
        &self,
        op: &'static str,
        location: &str,
        limit: Duration,
        operation: F,
    ) -> ContentResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ContentResult<T>>,
    {
        self.retrying(op, location, Some(limit), operation).await
    }

    /// Like [`Resilience::call`], but the attempt as a whole is not bounded.
    /// For multi-request operations that bound each request themselves with
    /// [`Resilience::bounded`].
    pub async fn call_stepwise<T, F, Fut>(
        &self,
        op: &'static str,
        location: &str,
        operation: F,
    ) -> ContentResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ContentResult<T>>,
    {
        self.retrying(op, location, None, operation).await
    }

    async fn retrying<T, F, Fut>(
        &self,
        op: &'static str,
        location: &str,
        limit: Option<Duration>,
        mut operation: F,
    ) -> ContentResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ContentResult<T>>,
    {
        let mut attempt = 1;
        loop {
            let result = match self.acquire(op, location) {
                Ok(permit) => {
                    let result = match limit {
                        Some(limit) => self.bounded_by(op, location, limit, operation()).await,
                        None => operation().await,
                    };
                    permit.record(&result);
                    result
                }
                Err(err) => Err(err),
            };
            let err = match result {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if attempt < self.retry.max_attempts && self.retry.should_retry(&err) {
                warn!(
                    op,
                    location,
                    attempt,
                    max_attempts = self.retry.max_attempts,
                    error = %err,
                    "backend call failed, retrying"
                );
                tokio::time::sleep(self.retry.wait).await;
                attempt += 1;
                continue;
            }

            if err.is_not_found() {
                debug!(op, location, attempts = attempt, "content not found");
            } else {
                error!(op, location, attempts = attempt, error = %err, "backend call failed");
            }
            return Err(err);
        }
    }

    /// One guarded attempt: breaker permit, then the timeout-bounded call.
    pub async fn call_once<T, Fut>(
        &self,
        op: &'static str,
        location: &str,
        fut: Fut,
    ) -> ContentResult<T>
    where
        Fut: Future<Output = ContentResult<T>>,
    {
        let permit = self.acquire(op, location)?;
        let result = self.bounded(op, location, fut).await;
        permit.record(&result);
        result
    }

    /// Breaker permit for calls that cannot be replayed (streamed uploads).
    pub fn acquire(&self, op: &'static str, location: &str) -> ContentResult<CallPermit> {
        self.breaker
            .try_acquire()
            .map_err(|CallNotPermitted| ContentError::CircuitOpen {
                op,
                target: location.to_string(),
            })
    }

    /// Apply the per-call timeout only.
    pub async fn bounded<T, Fut>(
        &self,
        op: &'static str,
        location: &str,
        fut: Fut,
    ) -> ContentResult<T>
    where
        Fut: Future<Output = ContentResult<T>>,
    {
        self.bounded_by(op, location, self.timeout, fut).await
    }

    async fn bounded_by<T, Fut>(
        &self,
        op: &'static str,
        location: &str,
        limit: Duration,
        fut: Fut,
    ) -> ContentResult<T>
    where
        Fut: Future<Output = ContentResult<T>>,
    {
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(ContentError::Timeout {
                op,
                target: location.to_string(),
                after: limit,
            }),
        }
    }
}
