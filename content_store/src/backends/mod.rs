//! Backend registry: maps the configured adapter type to an object store
//! client.

pub mod azure;
pub mod local;

use std::sync::Arc;

use object_store::{memory::InMemory, ObjectStore};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::info;

use crate::{ContentError, ContentResult, ContentStoreConfig};

/// Adapter variants, keyed by the `adapter_type` configuration string.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AdapterType {
    #[default]
    AzureBlob,
    Memory,
    Local,
}

impl AdapterType {
    pub fn parse(value: &str) -> ContentResult<Self> {
        value
            .parse()
            .map_err(|_| ContentError::configuration(format!("unknown adapter type: {}", value)))
    }

    pub fn descriptor(self) -> AdapterDescriptor {
        match self {
            AdapterType::AzureBlob => AdapterDescriptor {
                adapter_type: "azure-blob-content",
                description: "Microsoft Azure Blob Storage Document Content Adapter",
                features: &[
                    AdapterFeature::ContentStorage,
                    AdapterFeature::Streaming,
                    AdapterFeature::CloudStorage,
                ],
                required_properties: &["account-name", "container-name"],
                optional_properties: &[
                    "account-key",
                    "connection-string",
                    "sas-token",
                    "managed-identity",
                    "endpoint",
                    "path-prefix",
                    "block-size",
                    "block-upload-threshold",
                ],
            },
            AdapterType::Memory => AdapterDescriptor {
                adapter_type: "memory-content",
                description: "In-memory Document Content Adapter",
                features: &[AdapterFeature::ContentStorage, AdapterFeature::Streaming],
                required_properties: &[],
                optional_properties: &["path-prefix", "block-size", "block-upload-threshold"],
            },
            AdapterType::Local => AdapterDescriptor {
                adapter_type: "local-content",
                description: "Local Filesystem Document Content Adapter",
                features: &[AdapterFeature::ContentStorage, AdapterFeature::Streaming],
                required_properties: &["local-path"],
                optional_properties: &["path-prefix", "block-size", "block-upload-threshold"],
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AdapterFeature {
    ContentStorage,
    Streaming,
    CloudStorage,
}

/// Static description of an adapter variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterDescriptor {
    pub adapter_type: &'static str,
    pub description: &'static str,
    pub features: &'static [AdapterFeature],
    pub required_properties: &'static [&'static str],
    pub optional_properties: &'static [&'static str],
}

/// Build the object store client for the configured adapter.
pub fn build_object_store(config: &ContentStoreConfig) -> ContentResult<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.adapter_type {
        AdapterType::AzureBlob => Arc::new(azure::build(config)?),
        AdapterType::Memory => Arc::new(InMemory::new()),
        AdapterType::Local => Arc::new(local::build(config)?),
    };
    info!(adapter_type = %config.adapter_type, "created content store backend");
    Ok(store)
}
