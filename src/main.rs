use std::path::PathBuf;

use ::tracing::error;
use clap::Parser;

mod commands;
mod config;
mod tracing;
use commands::Commands;
use tracing::setup_tracing;

#[derive(Parser)]
#[command(name = "ecm-content", version, about = "Document content store CLI", long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "config file", help = "Path to config file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::AppConfig::load(cli.config.as_deref())?;

    let tracing_provider = setup_tracing(&config).inspect_err(|e| {
        eprintln!("Error setting up tracing: {:?}", e);
    })?;

    let result = commands::run(cli.command, &config).await;
    if let Err(err) = &result {
        error!("command failed: {:?}", err);
    }

    // export traces before shutdown
    if let Some(tracer_provider) = tracing_provider {
        if let Err(err) = tracer_provider.force_flush() {
            error!("Error flushing traces: {:?}", err);
        }
        if let Err(err) = tracer_provider.shutdown() {
            error!("Error shutting down tracer provider: {:?}", err);
        }
    }
    result
}
