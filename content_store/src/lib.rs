//! Document content storage on blob backends.
//!
//! Document content lives in one blob per document, named
//! `{path_prefix}{document_id}.content`. Every backend call goes through a
//! shared circuit breaker, a fixed-wait retry policy and a per-call timeout.
//!
//! ```no_run
//! use bytes::Bytes;
//! use content_store::{build_content_port, ContentStoreConfig};
//!
//! # async fn example() -> content_store::ContentResult<()> {
//! let port = build_content_port(&ContentStoreConfig::in_memory(), None)?;
//! let id = uuid::Uuid::new_v4();
//! port.store_content(id, Bytes::from_static(b"hello"), Some("text/plain"))
//!     .await?;
//! assert!(port.exists_content(id).await?);
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod checksum;
pub mod config;
pub mod error;
pub mod metrics;
pub mod naming;
pub mod port;
pub mod resilience;
pub mod store;
pub mod strategy;

use std::sync::Arc;

pub use backends::{build_object_store, AdapterDescriptor, AdapterFeature, AdapterType};
pub use checksum::ChecksumAlgorithm;
pub use config::{CircuitBreakerConfig, ContentStoreConfig, RetryConfig, RetryOn};
pub use error::{ContentError, ContentResult};
pub use metrics::ContentMetrics;
pub use naming::BlobNaming;
use opentelemetry::metrics::Meter;
pub use port::{ByteStream, DocumentContentPort};
pub use resilience::{CircuitBreaker, CircuitState, Resilience, RetryPolicy};
pub use store::BlobContentStore;
pub use strategy::UploadStrategy;
use tracing::info;

/// Validate the configuration, connect the configured backend and wrap it in
/// the resilient content store.
pub fn build_content_port(
    config: &ContentStoreConfig,
    meter: Option<&Meter>,
) -> ContentResult<Arc<dyn DocumentContentPort>> {
    config.validate()?;
    let object_store = build_object_store(config)?;
    let store = match meter {
        Some(meter) => BlobContentStore::new_with_metrics(object_store, config, meter),
        None => BlobContentStore::new(object_store, config),
    };
    info!(
        adapter = store.adapter_name(),
        adapter_type = %config.adapter_type,
        prefix = %config.path_prefix,
        "created document content store"
    );
    Ok(Arc::new(store))
}
