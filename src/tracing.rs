//! Log output and optional OTLP span export for the CLI.

use anyhow::{Context, Result};
use opentelemetry::{global, trace::TracerProvider as _};
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::{error, Subscriber};
use tracing_subscriber::{
    filter::LevelFilter,
    layer::SubscriberExt,
    registry::LookupSpan,
    EnvFilter,
    Layer,
};

use crate::config::{AppConfig, TelemetryConfig};

/// `RUST_LOG` when set, INFO otherwise.
fn env_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
}

/// Logs go to stderr so `get` can write content to stdout.
fn log_layer<S>(structured: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if structured {
        layer
            .json()
            .flatten_event(true)
            .with_span_list(false)
            .boxed()
    } else {
        layer.compact().boxed()
    }
}

fn tracer_provider(telemetry: &TelemetryConfig) -> Result<SdkTracerProvider> {
    let mut exporter = SpanExporter::builder().with_tonic();
    if let Some(endpoint) = &telemetry.endpoint {
        exporter = exporter.with_endpoint(endpoint.clone());
    }
    let exporter = exporter
        .build()
        .context("failed to build OTLP span exporter")?;
    Ok(SdkTracerProvider::builder()
        .with_simple_exporter(exporter)
        .build())
}

/// Install the global subscriber. Returns the tracer provider when span
/// export is enabled so the caller can flush it on exit.
pub fn setup_tracing(config: &AppConfig) -> Result<Option<SdkTracerProvider>> {
    let provider = if config.telemetry.enable_tracing {
        Some(tracer_provider(&config.telemetry)?)
    } else {
        None
    };
    let span_layer = provider.as_ref().map(|provider| {
        global::set_tracer_provider(provider.clone());
        tracing_opentelemetry::layer().with_tracer(provider.tracer("ecm-content"))
    });

    let subscriber = tracing_subscriber::registry()
        .with(log_layer(config.structured_logging).with_filter(env_filter()))
        .with(span_layer);
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        error!("logger was already initiated, continuing: {:?}", e);
    }
    Ok(provider)
}
