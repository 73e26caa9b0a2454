//! Fixed-wait retry policy.

use std::time::Duration;

use crate::{
    config::{ContentStoreConfig, RetryOn},
    ContentError,
};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, first call included. Always at least 1.
    pub max_attempts: u32,

    /// Wait between attempts.
    pub wait: Duration,

    pub retry_on: RetryOn,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, wait: Duration, retry_on: RetryOn) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            wait,
            retry_on,
        }
    }

    pub fn from_config(config: &ContentStoreConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry.wait_duration_ms),
            config.retry.retry_on,
        )
    }

    /// Breaker rejections and local validation failures never retry.
    pub fn should_retry(&self, err: &ContentError) -> bool {
        match err {
            ContentError::CircuitOpen { .. }
            | ContentError::Configuration { .. }
            | ContentError::Checksum { .. } => false,
            _ => match self.retry_on {
                RetryOn::Any => true,
                RetryOn::Transient => err.is_transient(),
            },
        }
    }
}
