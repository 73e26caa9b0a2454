use std::path::Path;

use anyhow::Result;
use content_store::ContentStoreConfig;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Prefix for environment overrides, e.g.
/// `ECM_CONTENT_STORE__CONTAINER_NAME=documents`.
const ENV_PREFIX: &str = "ECM_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    // Export spans over OTLP.
    #[serde(default)]
    pub enable_tracing: bool,

    // OTLP collector endpoint. Uses the exporter default when unset.
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub content_store: ContentStoreConfig,

    // Emit JSON log lines instead of the compact format.
    #[serde(default)]
    pub structured_logging: bool,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load from an optional YAML file, then apply `ECM_` environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<AppConfig> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            let config_str = std::fs::read_to_string(path)?;
            figment = figment.merge(Yaml::string(&config_str));
        }
        let config: AppConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.content_store.validate()?;
        if self.telemetry.endpoint.is_some() && !self.telemetry.enable_tracing {
            return Err(anyhow::anyhow!(
                "telemetry.endpoint is set but telemetry.enable_tracing is false"
            ));
        }
        Ok(())
    }
}
