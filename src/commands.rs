use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Result};
use clap::{Args, Subcommand};
use content_store::{build_content_port, ByteStream, ContentError, DocumentContentPort};
use futures::{StreamExt, TryStreamExt};
use opentelemetry::global;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;

#[derive(Debug, Args)]
pub struct TargetArgs {
    #[arg(help = "document id, or a storage path with --by-path")]
    target: String,

    #[arg(long, help = "address content by storage path instead of document id")]
    by_path: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Describe the configured adapter and check connectivity")]
    Describe,
    #[command(about = "Upload a file")]
    Put {
        #[command(flatten)]
        target: TargetArgs,

        file: PathBuf,

        #[arg(long)]
        mime_type: Option<String>,
    },
    #[command(about = "Download content")]
    Get {
        #[command(flatten)]
        target: TargetArgs,

        #[arg(short, long, help = "write to this file instead of stdout")]
        output: Option<PathBuf>,
    },
    #[command(about = "Download a byte range")]
    Range {
        #[command(flatten)]
        target: TargetArgs,

        offset: u64,

        length: u64,

        #[arg(short, long, help = "write to this file instead of stdout")]
        output: Option<PathBuf>,
    },
    #[command(about = "Check whether content exists")]
    Exists {
        #[command(flatten)]
        target: TargetArgs,
    },
    #[command(about = "Print the content size in bytes")]
    Size {
        #[command(flatten)]
        target: TargetArgs,
    },
    #[command(about = "Delete content (succeeds when already absent)")]
    Delete {
        #[command(flatten)]
        target: TargetArgs,
    },
    #[command(about = "Print the content checksum")]
    Checksum {
        #[command(flatten)]
        target: TargetArgs,

        #[arg(long, default_value = "SHA-256")]
        algorithm: String,
    },
    #[command(about = "Compare the content checksum with an expected value")]
    Verify {
        #[command(flatten)]
        target: TargetArgs,

        expected: String,

        #[arg(long, default_value = "SHA-256")]
        algorithm: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Address {
    Document(Uuid),
    Path(String),
}

impl TryFrom<&TargetArgs> for Address {
    type Error = anyhow::Error;

    fn try_from(args: &TargetArgs) -> Result<Self> {
        if args.by_path {
            return Ok(Address::Path(args.target.clone()));
        }
        let id = Uuid::parse_str(&args.target)
            .map_err(|e| anyhow!("invalid document id {}: {}", args.target, e))?;
        Ok(Address::Document(id))
    }
}

pub async fn run(command: Commands, config: &AppConfig) -> Result<()> {
    let meter = global::meter("ecm-content");
    let port = build_content_port(&config.content_store, Some(&meter))?;

    match command {
        Commands::Describe => describe(port.as_ref(), config).await,
        Commands::Put {
            target,
            file,
            mime_type,
        } => {
            let address = Address::try_from(&target)?;
            let block_size = usize::try_from(config.content_store.block_size)?;
            put(port, &address, file, mime_type.as_deref(), block_size).await
        }
        Commands::Get { target, output } => {
            let content = match Address::try_from(&target)? {
                Address::Document(id) => port.get_content_stream(id).await?,
                Address::Path(path) => port.get_content_stream_by_path(&path).await?,
            };
            write_stream(content, output).await
        }
        Commands::Range {
            target,
            offset,
            length,
            output,
        } => {
            let content = match Address::try_from(&target)? {
                Address::Document(id) => port.get_content_range(id, offset, length).await?,
                Address::Path(path) => {
                    port.get_content_range_by_path(&path, offset, length)
                        .await?
                }
            };
            write_stream(futures::stream::iter([Ok(content)]).boxed(), output).await
        }
        Commands::Exists { target } => {
            let exists = match Address::try_from(&target)? {
                Address::Document(id) => port.exists_content(id).await?,
                Address::Path(path) => port.exists_content_by_path(&path).await?,
            };
            println!("{}", exists);
            Ok(())
        }
        Commands::Size { target } => {
            let size = match Address::try_from(&target)? {
                Address::Document(id) => port.get_content_size(id).await?,
                Address::Path(path) => port.get_content_size_by_path(&path).await?,
            };
            println!("{}", size);
            Ok(())
        }
        Commands::Delete { target } => {
            match Address::try_from(&target)? {
                Address::Document(id) => port.delete_content(id).await?,
                Address::Path(path) => port.delete_content_by_path(&path).await?,
            }
            info!(location = %target.target, "deleted content");
            Ok(())
        }
        Commands::Checksum { target, algorithm } => {
            let checksum = match Address::try_from(&target)? {
                Address::Document(id) => port.calculate_checksum(id, &algorithm).await?,
                Address::Path(path) => port.calculate_checksum_by_path(&path, &algorithm).await?,
            };
            println!("{}", checksum);
            Ok(())
        }
        Commands::Verify {
            target,
            expected,
            algorithm,
        } => {
            let matches = match Address::try_from(&target)? {
                Address::Document(id) => port.verify_checksum(id, &expected, &algorithm).await?,
                Address::Path(path) => {
                    port.verify_checksum_by_path(&path, &expected, &algorithm)
                        .await?
                }
            };
            if !matches {
                bail!("{} checksum mismatch for {}", algorithm, target.target);
            }
            println!("ok");
            Ok(())
        }
    }
}

async fn describe(port: &dyn DocumentContentPort, config: &AppConfig) -> Result<()> {
    let descriptor = config.content_store.adapter_type.descriptor();
    println!("adapter:     {}", port.adapter_name());
    println!("type:        {}", descriptor.adapter_type);
    println!("description: {}", descriptor.description);
    let features: Vec<String> = descriptor.features.iter().map(|f| f.to_string()).collect();
    println!("features:    {}", features.join(", "));
    println!("required:    {}", descriptor.required_properties.join(", "));
    println!("optional:    {}", descriptor.optional_properties.join(", "));
    port.health_check().await?;
    println!("status:      reachable");
    Ok(())
}

async fn put(
    port: Arc<dyn DocumentContentPort>,
    address: &Address,
    file: PathBuf,
    mime_type: Option<&str>,
    block_size: usize,
) -> Result<()> {
    let file = tokio::fs::File::open(&file).await?;
    let content_length = file.metadata().await?.len();
    let content: ByteStream = ReaderStream::with_capacity(file, block_size)
        .map_err(ContentError::from)
        .boxed();

    let name = match address {
        Address::Document(id) => {
            port.store_content_stream(*id, content, mime_type, Some(content_length))
                .await?
        }
        Address::Path(path) => {
            port.store_content_stream_by_path(path, content, mime_type, Some(content_length))
                .await?
        }
    };
    println!("{}", name);
    Ok(())
}

async fn write_stream(mut content: ByteStream, output: Option<PathBuf>) -> Result<()> {
    let mut writer: Box<dyn AsyncWrite + Unpin + Send> = match output {
        Some(path) => Box::new(tokio::fs::File::create(path).await?),
        None => Box::new(tokio::io::stdout()),
    };
    while let Some(chunk) = content.next().await {
        writer.write_all(&chunk?).await?;
    }
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(target: &str, by_path: bool) -> TargetArgs {
        TargetArgs {
            target: target.to_string(),
            by_path,
        }
    }

    #[test]
    fn test_address_parsing() {
        let id = Uuid::new_v4();
        assert_eq!(
            Address::try_from(&target(&id.to_string(), false)).unwrap(),
            Address::Document(id)
        );
        assert_eq!(
            Address::try_from(&target("archive/a.pdf", true)).unwrap(),
            Address::Path("archive/a.pdf".to_string())
        );
        assert!(Address::try_from(&target("archive/a.pdf", false)).is_err());
    }

    #[tokio::test]
    async fn test_put_then_get_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.txt");
        let output = dir.path().join("output.txt");
        std::fs::write(&input, b"quarterly report").unwrap();

        let config = AppConfig {
            content_store: content_store::ContentStoreConfig::in_memory(),
            ..Default::default()
        };
        let port = build_content_port(&config.content_store, None).unwrap();
        let address = Address::Document(Uuid::new_v4());

        put(port.clone(), &address, input, Some("text/plain"), 4)
            .await
            .unwrap();

        let Address::Document(id) = address else {
            unreachable!()
        };
        let content = port.get_content_stream(id).await.unwrap();
        write_stream(content, Some(output.clone())).await.unwrap();
        assert_eq!(std::fs::read(output).unwrap(), b"quarterly report");
    }
}
