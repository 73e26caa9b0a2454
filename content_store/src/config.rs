//! Content store configuration.

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{backends::AdapterType, ContentError, ContentResult};

pub const DEFAULT_PATH_PREFIX: &str = "documents/";
pub const DEFAULT_BLOCK_SIZE: u64 = 4 * 1024 * 1024;
pub const DEFAULT_BLOCK_UPLOAD_THRESHOLD: u64 = 256 * 1024 * 1024;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

const MIN_BLOCK_SIZE: u64 = 1024;
const MAX_RETRIES_LIMIT: u32 = 10;
const TIMEOUT_SECONDS_RANGE: std::ops::RangeInclusive<u64> = 1..=300;

/// Configuration for the document content store.
///
/// Field names are the `azure-blob` adapter property names
/// in snake_case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentStoreConfig {
    /// Backend selection key (`azure-blob`, `memory`, `local`).
    #[serde(default)]
    pub adapter_type: AdapterType,

    /// Azure storage account name.
    #[serde(default)]
    pub account_name: Option<String>,

    /// Azure blob container name.
    #[serde(default)]
    pub container_name: Option<String>,

    #[serde(default)]
    pub account_key: Option<String>,

    #[serde(default)]
    pub connection_string: Option<String>,

    #[serde(default)]
    pub sas_token: Option<String>,

    /// Use the ambient managed identity when no other credential is set.
    #[serde(default)]
    pub managed_identity: bool,

    /// Overrides `https://{account}.blob.core.windows.net`.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Root directory for the `local` adapter.
    #[serde(default)]
    pub local_path: Option<PathBuf>,

    /// Prepended verbatim to generated blob names. Not normalized.
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,

    /// Chunk size for streamed reads and block uploads.
    #[serde(default = "default_block_size")]
    pub block_size: u64,

    /// Payloads larger than this are uploaded as block blobs.
    #[serde(default = "default_block_upload_threshold")]
    pub block_upload_threshold: u64,

    /// Total attempts per call, first call included. `0` still makes one
    /// attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-call timeout for backend operations.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for ContentStoreConfig {
    fn default() -> Self {
        Self {
            adapter_type: AdapterType::default(),
            account_name: None,
            container_name: None,
            account_key: None,
            connection_string: None,
            sas_token: None,
            managed_identity: false,
            endpoint: None,
            local_path: None,
            path_prefix: default_path_prefix(),
            block_size: DEFAULT_BLOCK_SIZE,
            block_upload_threshold: DEFAULT_BLOCK_UPLOAD_THRESHOLD,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            circuit_breaker: CircuitBreakerConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl ContentStoreConfig {
    /// In-memory configuration, mostly for tests and local development.
    pub fn in_memory() -> Self {
        Self {
            adapter_type: AdapterType::Memory,
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn validate(&self) -> ContentResult<()> {
        if self.block_size < MIN_BLOCK_SIZE {
            return Err(ContentError::configuration(format!(
                "block_size must be at least {} bytes, got {}",
                MIN_BLOCK_SIZE, self.block_size
            )));
        }
        if usize::try_from(self.block_size).is_err() {
            return Err(ContentError::configuration(format!(
                "block_size {} does not fit in memory on this platform",
                self.block_size
            )));
        }
        if self.block_upload_threshold < MIN_BLOCK_SIZE {
            return Err(ContentError::configuration(format!(
                "block_upload_threshold must be at least {} bytes, got {}",
                MIN_BLOCK_SIZE, self.block_upload_threshold
            )));
        }
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ContentError::configuration(format!(
                "max_retries must be between 0 and {}, got {}",
                MAX_RETRIES_LIMIT, self.max_retries
            )));
        }
        if !TIMEOUT_SECONDS_RANGE.contains(&self.timeout_seconds) {
            return Err(ContentError::configuration(format!(
                "timeout_seconds must be between {} and {}, got {}",
                TIMEOUT_SECONDS_RANGE.start(),
                TIMEOUT_SECONDS_RANGE.end(),
                self.timeout_seconds
            )));
        }
        self.circuit_breaker.validate()?;

        match self.adapter_type {
            AdapterType::AzureBlob => {
                if is_blank(&self.container_name) {
                    return Err(ContentError::configuration(
                        "Azure Blob container name is required",
                    ));
                }
                if is_blank(&self.account_name) && is_blank(&self.connection_string) {
                    return Err(ContentError::configuration(
                        "Azure Storage account name is required",
                    ));
                }
            }
            AdapterType::Local => {
                if self.local_path.is_none() {
                    return Err(ContentError::configuration(
                        "local_path is required for the local adapter",
                    ));
                }
            }
            AdapterType::Memory => {}
        }
        Ok(())
    }
}

/// Circuit breaker tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CircuitBreakerConfig {
    /// Failure percentage (0-100] at which the circuit opens.
    #[serde(default = "default_failure_rate_threshold")]
    pub failure_rate_threshold: f32,

    /// Number of most recent calls considered.
    #[serde(default = "default_sliding_window_size")]
    pub sliding_window_size: usize,

    /// Calls required in the window before the rate is evaluated.
    #[serde(default = "default_minimum_number_of_calls")]
    pub minimum_number_of_calls: usize,

    #[serde(default = "default_wait_duration_in_open_state_secs")]
    pub wait_duration_in_open_state_secs: u64,

    #[serde(default = "default_permitted_calls_in_half_open_state")]
    pub permitted_calls_in_half_open_state: usize,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: default_failure_rate_threshold(),
            sliding_window_size: default_sliding_window_size(),
            minimum_number_of_calls: default_minimum_number_of_calls(),
            wait_duration_in_open_state_secs: default_wait_duration_in_open_state_secs(),
            permitted_calls_in_half_open_state: default_permitted_calls_in_half_open_state(),
        }
    }
}

impl CircuitBreakerConfig {
    pub fn wait_duration_in_open_state(&self) -> Duration {
        Duration::from_secs(self.wait_duration_in_open_state_secs)
    }

    pub fn validate(&self) -> ContentResult<()> {
        if !(self.failure_rate_threshold > 0.0 && self.failure_rate_threshold <= 100.0) {
            return Err(ContentError::configuration(format!(
                "failure_rate_threshold must be in (0, 100], got {}",
                self.failure_rate_threshold
            )));
        }
        if self.sliding_window_size == 0 {
            return Err(ContentError::configuration(
                "sliding_window_size must be at least 1",
            ));
        }
        if self.minimum_number_of_calls == 0 {
            return Err(ContentError::configuration(
                "minimum_number_of_calls must be at least 1",
            ));
        }
        if self.permitted_calls_in_half_open_state == 0 {
            return Err(ContentError::configuration(
                "permitted_calls_in_half_open_state must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Which errors trigger another attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryOn {
    /// Every error except breaker rejections and local validation failures.
    #[default]
    Any,
    /// Only backend failures and timeouts.
    Transient,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    #[serde(default = "default_retry_wait_ms")]
    pub wait_duration_ms: u64,

    #[serde(default)]
    pub retry_on: RetryOn,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            wait_duration_ms: default_retry_wait_ms(),
            retry_on: RetryOn::default(),
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn default_path_prefix() -> String {
    DEFAULT_PATH_PREFIX.to_string()
}

fn default_block_size() -> u64 {
    DEFAULT_BLOCK_SIZE
}

fn default_block_upload_threshold() -> u64 {
    DEFAULT_BLOCK_UPLOAD_THRESHOLD
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_failure_rate_threshold() -> f32 {
    50.0
}

fn default_sliding_window_size() -> usize {
    10
}

fn default_minimum_number_of_calls() -> usize {
    5
}

fn default_wait_duration_in_open_state_secs() -> u64 {
    30
}

fn default_permitted_calls_in_half_open_state() -> usize {
    3
}

fn default_retry_wait_ms() -> u64 {
    2000
}
