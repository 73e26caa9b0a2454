//! Blob-backed implementation of [`DocumentContentPort`].

use std::{sync::Arc, time::Duration};

use async_stream::try_stream;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{
    stream::{self, BoxStream},
    Stream,
    StreamExt,
};
use object_store::{
    path::Path,
    Attribute,
    Attributes,
    GetOptions,
    ObjectStore,
    PutMultipartOpts,
    PutOptions,
    PutPayload,
    WriteMultipart,
};
use opentelemetry::{metrics::Meter, KeyValue};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    backends::AdapterType,
    checksum::{checksums_match, ChecksumAlgorithm},
    metrics::{ContentMetrics, Timer},
    naming::BlobNaming,
    port::{ByteStream, DocumentContentPort},
    resilience::Resilience,
    strategy::UploadStrategy,
    ContentError,
    ContentResult,
    ContentStoreConfig,
};

pub const ADAPTER_NAME: &str = "AzureBlobDocumentContentAdapter";

/// Block uploads in flight per chunked upload.
const MAX_CONCURRENT_BLOCK_UPLOADS: usize = 10;

/// A resolved blob address plus the label used in logs and errors.
#[derive(Debug, Clone)]
struct Location {
    path: Path,
    target: String,
}

/// Content store over any `object_store` backend, with every remote call
/// going through the shared [`Resilience`] policies.
pub struct BlobContentStore {
    store: Arc<dyn ObjectStore>,
    naming: BlobNaming,
    resilience: Resilience,
    block_size: usize,
    block_upload_threshold: u64,
    // The local filesystem backend rejects object attributes.
    content_type_metadata: bool,
    metrics: Option<ContentMetrics>,
}

impl BlobContentStore {
    pub fn new(store: Arc<dyn ObjectStore>, config: &ContentStoreConfig) -> Self {
        Self::build(store, config, None)
    }

    pub fn new_with_metrics(
        store: Arc<dyn ObjectStore>,
        config: &ContentStoreConfig,
        meter: &Meter,
    ) -> Self {
        Self::build(store, config, Some(ContentMetrics::new(meter)))
    }

    fn build(
        store: Arc<dyn ObjectStore>,
        config: &ContentStoreConfig,
        metrics: Option<ContentMetrics>,
    ) -> Self {
        Self {
            store,
            naming: BlobNaming::new(config.path_prefix.clone()),
            resilience: Resilience::from_config(config, metrics.clone()),
            block_size: usize::try_from(config.block_size).unwrap_or(usize::MAX),
            block_upload_threshold: config.block_upload_threshold,
            content_type_metadata: config.adapter_type != AdapterType::Local,
            metrics,
        }
    }

    pub fn resilience(&self) -> &Resilience {
        &self.resilience
    }

    pub fn naming(&self) -> &BlobNaming {
        &self.naming
    }

    fn document(&self, document_id: &Uuid) -> Location {
        Location {
            path: Path::from(self.naming.blob_name(document_id)),
            target: format!("document {}", document_id),
        }
    }

    fn by_path(&self, path: &str) -> Location {
        Location {
            path: Path::from(path),
            target: format!("path {}", path),
        }
    }

    fn timer(&self, op: &'static str) -> Option<Timer> {
        self.metrics.as_ref().map(|m| m.time(op))
    }

    fn observe<T>(&self, op: &'static str, result: ContentResult<T>) -> ContentResult<T> {
        if let (Err(_), Some(metrics)) = (&result, &self.metrics) {
            metrics.record_error(op);
        }
        result
    }

    fn attributes(&self, mime_type: Option<&str>) -> Attributes {
        let mut attributes = Attributes::new();
        match mime_type {
            Some(mime) if self.content_type_metadata => {
                attributes.insert(Attribute::ContentType, mime.to_string().into());
            }
            Some(mime) => debug!(mime, "backend does not keep content type, skipping"),
            None => {}
        }
        attributes
    }

    fn record_upload(&self, strategy: UploadStrategy, size: u64) {
        if let Some(metrics) = &self.metrics {
            metrics
                .uploaded_bytes
                .add(size, &[KeyValue::new("strategy", strategy.as_ref().to_string())]);
        }
    }

    /// Attempt limit for a single-request upload: one call timeout per block
    /// of payload.
    fn transfer_timeout(&self, size: u64) -> Duration {
        let blocks = size.div_ceil(self.block_size.max(1) as u64).max(1);
        self.resilience
            .timeout()
            .saturating_mul(u32::try_from(blocks).unwrap_or(u32::MAX))
    }

    async fn put_bytes(
        &self,
        loc: &Location,
        content: Bytes,
        mime_type: Option<&str>,
    ) -> ContentResult<()> {
        let size = content.len() as u64;
        let strategy = UploadStrategy::select(size, self.block_upload_threshold);
        let result = match strategy {
            UploadStrategy::Single => {
                let attributes = self.attributes(mime_type);
                let limit = self.transfer_timeout(size);
                self.resilience
                    .call_with_timeout("store", &loc.target, limit, move || {
                        let payload = PutPayload::from(content.clone());
                        let options = PutOptions {
                            attributes: attributes.clone(),
                            ..Default::default()
                        };
                        async move {
                            self.store
                                .put_opts(&loc.path, payload, options)
                                .await
                                .map(|_| ())
                                .map_err(|e| ContentError::backend("store", &loc.target, e))
                        }
                    })
                    .await
            }
            UploadStrategy::Chunked => {
                self.resilience
                    .call_stepwise("store", &loc.target, move || {
                        let content = stream::iter([Ok(content.clone())]);
                        async move {
                            self.put_chunked("store", loc, mime_type, content)
                                .await
                                .map(|_| ())
                        }
                    })
                    .await
            }
        };
        result.map_err(|e| ContentError::upload(&loc.target, e))?;

        self.record_upload(strategy, size);
        debug!(location = %loc.target, size, %strategy, "stored content");
        Ok(())
    }

    /// Streamed store. Buffers up to the block upload threshold; anything
    /// larger goes out as a single non-replayable chunked upload.
    async fn put_stream(
        &self,
        loc: &Location,
        mut content: ByteStream,
        mime_type: Option<&str>,
        content_length: Option<u64>,
    ) -> ContentResult<()> {
        let threshold = self.block_upload_threshold;
        let mut head = BytesMut::new();
        let chunked = match content_length {
            Some(length) if length > threshold => true,
            _ => {
                let mut exceeded = false;
                while let Some(chunk) = content.next().await {
                    let chunk = chunk.map_err(|e| ContentError::upload(&loc.target, e))?;
                    head.extend_from_slice(&chunk);
                    if head.len() as u64 > threshold {
                        exceeded = true;
                        break;
                    }
                }
                exceeded
            }
        };

        if !chunked {
            return self.put_bytes(loc, head.freeze(), mime_type).await;
        }

        let content = stream::iter([Ok(head.freeze())]).chain(content);
        let result = match self.resilience.acquire("store_stream", &loc.target) {
            Ok(permit) => {
                let result = self
                    .put_chunked("store_stream", loc, mime_type, content)
                    .await;
                permit.record(&result);
                result
            }
            Err(err) => Err(err),
        };
        let size = result.map_err(|e| ContentError::upload(&loc.target, e))?;

        self.record_upload(UploadStrategy::Chunked, size);
        debug!(location = %loc.target, size, "stored streamed content in blocks");
        Ok(())
    }

    /// Multipart upload in `block_size` parts. Each backend interaction is
    /// bounded by the call timeout; a failed upload is aborted.
    async fn put_chunked<S>(
        &self,
        op: &'static str,
        loc: &Location,
        mime_type: Option<&str>,
        mut content: S,
    ) -> ContentResult<u64>
    where
        S: Stream<Item = ContentResult<Bytes>> + Send + Unpin,
    {
        let options = PutMultipartOpts {
            attributes: self.attributes(mime_type),
            ..Default::default()
        };
        let upload = self
            .resilience
            .bounded(op, &loc.target, async {
                self.store
                    .put_multipart_opts(&loc.path, options)
                    .await
                    .map_err(|e| ContentError::backend(op, &loc.target, e))
            })
            .await?;

        let mut writer = WriteMultipart::new_with_chunk_size(upload, self.block_size);
        let mut written = 0u64;
        let outcome: ContentResult<()> = async {
            while let Some(chunk) = content.next().await {
                let chunk = chunk?;
                for block in chunk.chunks(self.block_size) {
                    self.resilience
                        .bounded(op, &loc.target, async {
                            writer
                                .wait_for_capacity(MAX_CONCURRENT_BLOCK_UPLOADS)
                                .await
                                .map_err(|e| ContentError::backend(op, &loc.target, e))
                        })
                        .await?;
                    writer.write(block);
                }
                written += chunk.len() as u64;
            }
            Ok::<(), ContentError>(())
        }
        .await;

        if let Err(err) = outcome {
            if let Err(abort_err) = writer.abort().await {
                warn!(location = %loc.target, error = %abort_err, "failed to abort block upload");
            }
            return Err(err);
        }

        self.resilience
            .bounded(op, &loc.target, async {
                writer
                    .finish()
                    .await
                    .map_err(|e| ContentError::backend(op, &loc.target, e))
            })
            .await?;
        Ok(written)
    }

    /// Read a blob (or part of it) into memory. The request and each body
    /// read are bounded by the call timeout separately.
    async fn download(
        &self,
        op: &'static str,
        loc: &Location,
        options: GetOptions,
    ) -> ContentResult<Bytes> {
        let result = self
            .resilience
            .bounded(op, &loc.target, async {
                self.store
                    .get_opts(&loc.path, options)
                    .await
                    .map_err(|e| ContentError::backend(op, &loc.target, e))
            })
            .await?;
        let mut content = BytesMut::with_capacity(usize::try_from(result.meta.size).unwrap_or(0));
        let mut body = result.into_stream();
        let read_timeout = self.resilience.timeout();
        while let Some(chunk) = next_chunk(&mut body, read_timeout, op, &loc.target).await? {
            content.extend_from_slice(&chunk);
        }
        Ok(content.freeze())
    }

    async fn get(&self, loc: &Location) -> ContentResult<Bytes> {
        let content = self
            .resilience
            .call_stepwise("get", &loc.target, move || {
                self.download("get", loc, GetOptions::default())
            })
            .await?;
        debug!(location = %loc.target, size = content.len(), "retrieved content");
        Ok(content)
    }

    /// Open the blob through the resilience policies and hand back a lazy
    /// block-sized chunk stream over the open handle.
    async fn open_stream(&self, op: &'static str, loc: &Location) -> ContentResult<ByteStream> {
        let result = self
            .resilience
            .call(op, &loc.target, move || async move {
                self.store
                    .get(&loc.path)
                    .await
                    .map_err(|e| ContentError::backend(op, &loc.target, e))
            })
            .await?;
        debug!(location = %loc.target, size = result.meta.size, "opened content stream");
        Ok(rechunk(
            result.into_stream(),
            self.block_size,
            self.resilience.timeout(),
            op,
            loc.target.clone(),
        )
        .boxed())
    }

    async fn head_size(&self, op: &'static str, loc: &Location) -> ContentResult<u64> {
        self.resilience
            .call(op, &loc.target, move || async move {
                self.store
                    .head(&loc.path)
                    .await
                    .map(|meta| meta.size)
                    .map_err(|e| ContentError::backend(op, &loc.target, e))
            })
            .await
    }

    async fn get_range(&self, loc: &Location, offset: u64, length: u64) -> ContentResult<Bytes> {
        let size = self.head_size("get_range", loc).await?;
        if offset >= size || length == 0 {
            debug!(location = %loc.target, offset, size, "range starts past the end");
            return Ok(Bytes::new());
        }
        let end = offset.saturating_add(length).min(size);
        let content = self
            .resilience
            .call_stepwise("get_range", &loc.target, move || {
                let options = GetOptions {
                    range: Some((offset..end).into()),
                    ..Default::default()
                };
                self.download("get_range", loc, options)
            })
            .await?;
        debug!(
            location = %loc.target,
            offset,
            length,
            returned = content.len(),
            "retrieved content range"
        );
        Ok(content)
    }

    async fn exists(&self, loc: &Location) -> ContentResult<bool> {
        let exists = self
            .resilience
            .call("exists", &loc.target, move || async move {
                match self.store.head(&loc.path).await {
                    Ok(_) => Ok(true),
                    Err(object_store::Error::NotFound { .. }) => Ok(false),
                    Err(e) => Err(ContentError::backend("exists", &loc.target, e)),
                }
            })
            .await?;
        debug!(location = %loc.target, exists, "checked content existence");
        Ok(exists)
    }

    async fn size(&self, loc: &Location) -> ContentResult<u64> {
        let size = self.head_size("size", loc).await?;
        debug!(location = %loc.target, size, "retrieved content size");
        Ok(size)
    }

    async fn delete(&self, loc: &Location) -> ContentResult<()> {
        self.resilience
            .call("delete", &loc.target, move || async move {
                match self.store.delete(&loc.path).await {
                    Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
                    Err(e) => Err(ContentError::backend("delete", &loc.target, e)),
                }
            })
            .await?;
        debug!(location = %loc.target, "deleted content");
        Ok(())
    }

    async fn checksum(&self, loc: &Location, algorithm: &str) -> ContentResult<String> {
        let algorithm = ChecksumAlgorithm::parse(algorithm)?;
        let mut content = self.open_stream("checksum", loc).await?;
        let mut hasher = algorithm.hasher();
        while let Some(chunk) = content.next().await {
            hasher.update(&chunk?);
        }
        let checksum = hasher.finalize_hex();
        debug!(location = %loc.target, %algorithm, checksum = %checksum, "calculated checksum");
        Ok(checksum)
    }

    async fn verify(&self, loc: &Location, expected: &str, algorithm: &str) -> ContentResult<bool> {
        let actual = self.checksum(loc, algorithm).await?;
        let matches = checksums_match(&actual, expected);
        debug!(location = %loc.target, expected, actual = %actual, matches, "verified checksum");
        Ok(matches)
    }
}

/// Next chunk of a backend body, the read bounded by `read_timeout`.
async fn next_chunk(
    body: &mut BoxStream<'static, object_store::Result<Bytes>>,
    read_timeout: Duration,
    op: &'static str,
    target: &str,
) -> ContentResult<Option<Bytes>> {
    match tokio::time::timeout(read_timeout, body.next()).await {
        Err(_) => Err(ContentError::Timeout {
            op,
            target: target.to_string(),
            after: read_timeout,
        }),
        Ok(None) => Ok(None),
        Ok(Some(chunk)) => chunk
            .map(Some)
            .map_err(|e| ContentError::backend(op, target, e)),
    }
}

/// Re-slice a backend byte stream into `block_size` chunks. Pull-based: the
/// next backend read happens only when the consumer asks for more, and
/// dropping the stream drops the backend handle.
fn rechunk(
    mut inner: BoxStream<'static, object_store::Result<Bytes>>,
    block_size: usize,
    read_timeout: Duration,
    op: &'static str,
    target: String,
) -> impl Stream<Item = ContentResult<Bytes>> + Send + 'static {
    try_stream! {
        let mut buffer = BytesMut::new();
        loop {
            let chunk = match next_chunk(&mut inner, read_timeout, op, &target).await? {
                Some(chunk) => chunk,
                None => break,
            };
            buffer.extend_from_slice(&chunk);
            while buffer.len() >= block_size {
                yield buffer.split_to(block_size).freeze();
            }
        }
        if !buffer.is_empty() {
            yield buffer.freeze();
        }
    }
}

#[async_trait]
impl DocumentContentPort for BlobContentStore {
    async fn store_content(
        &self,
        document_id: Uuid,
        content: Bytes,
        mime_type: Option<&str>,
    ) -> ContentResult<String> {
        let _timer = self.timer("store");
        let loc = self.document(&document_id);
        let result = self.put_bytes(&loc, content, mime_type).await;
        self.observe("store", result)?;
        Ok(self.naming.blob_name(&document_id))
    }

    async fn store_content_stream(
        &self,
        document_id: Uuid,
        content: ByteStream,
        mime_type: Option<&str>,
        content_length: Option<u64>,
    ) -> ContentResult<String> {
        let _timer = self.timer("store_stream");
        let loc = self.document(&document_id);
        let result = self
            .put_stream(&loc, content, mime_type, content_length)
            .await;
        self.observe("store_stream", result)?;
        Ok(self.naming.blob_name(&document_id))
    }

    async fn get_content(&self, document_id: Uuid) -> ContentResult<Bytes> {
        let _timer = self.timer("get");
        let result = self.get(&self.document(&document_id)).await;
        self.observe("get", result)
    }

    async fn get_content_stream(&self, document_id: Uuid) -> ContentResult<ByteStream> {
        let _timer = self.timer("get_stream");
        let result = self
            .open_stream("get_stream", &self.document(&document_id))
            .await;
        self.observe("get_stream", result)
    }

    async fn get_content_range(
        &self,
        document_id: Uuid,
        offset: u64,
        length: u64,
    ) -> ContentResult<Bytes> {
        let _timer = self.timer("get_range");
        let result = self
            .get_range(&self.document(&document_id), offset, length)
            .await;
        self.observe("get_range", result)
    }

    async fn exists_content(&self, document_id: Uuid) -> ContentResult<bool> {
        let _timer = self.timer("exists");
        let result = self.exists(&self.document(&document_id)).await;
        self.observe("exists", result)
    }

    async fn get_content_size(&self, document_id: Uuid) -> ContentResult<u64> {
        let _timer = self.timer("size");
        let result = self.size(&self.document(&document_id)).await;
        self.observe("size", result)
    }

    async fn delete_content(&self, document_id: Uuid) -> ContentResult<()> {
        let _timer = self.timer("delete");
        let result = self.delete(&self.document(&document_id)).await;
        self.observe("delete", result)
    }

    async fn store_content_by_path(
        &self,
        path: &str,
        content: Bytes,
        mime_type: Option<&str>,
    ) -> ContentResult<String> {
        let _timer = self.timer("store");
        let loc = self.by_path(path);
        let result = self.put_bytes(&loc, content, mime_type).await;
        self.observe("store", result)?;
        Ok(loc.path.to_string())
    }

    async fn store_content_stream_by_path(
        &self,
        path: &str,
        content: ByteStream,
        mime_type: Option<&str>,
        content_length: Option<u64>,
    ) -> ContentResult<String> {
        let _timer = self.timer("store_stream");
        let loc = self.by_path(path);
        let result = self
            .put_stream(&loc, content, mime_type, content_length)
            .await;
        self.observe("store_stream", result)?;
        Ok(loc.path.to_string())
    }

    async fn get_content_by_path(&self, path: &str) -> ContentResult<Bytes> {
        let _timer = self.timer("get");
        let result = self.get(&self.by_path(path)).await;
        self.observe("get", result)
    }

    async fn get_content_stream_by_path(&self, path: &str) -> ContentResult<ByteStream> {
        let _timer = self.timer("get_stream");
        let result = self.open_stream("get_stream", &self.by_path(path)).await;
        self.observe("get_stream", result)
    }

    async fn get_content_range_by_path(
        &self,
        path: &str,
        offset: u64,
        length: u64,
    ) -> ContentResult<Bytes> {
        let _timer = self.timer("get_range");
        let result = self.get_range(&self.by_path(path), offset, length).await;
        self.observe("get_range", result)
    }

    async fn exists_content_by_path(&self, path: &str) -> ContentResult<bool> {
        let _timer = self.timer("exists");
        let result = self.exists(&self.by_path(path)).await;
        self.observe("exists", result)
    }

    async fn get_content_size_by_path(&self, path: &str) -> ContentResult<u64> {
        let _timer = self.timer("size");
        let result = self.size(&self.by_path(path)).await;
        self.observe("size", result)
    }

    async fn delete_content_by_path(&self, path: &str) -> ContentResult<()> {
        let _timer = self.timer("delete");
        let result = self.delete(&self.by_path(path)).await;
        self.observe("delete", result)
    }

    async fn calculate_checksum(
        &self,
        document_id: Uuid,
        algorithm: &str,
    ) -> ContentResult<String> {
        let _timer = self.timer("checksum");
        let result = self.checksum(&self.document(&document_id), algorithm).await;
        self.observe("checksum", result)
    }

    async fn calculate_checksum_by_path(
        &self,
        path: &str,
        algorithm: &str,
    ) -> ContentResult<String> {
        let _timer = self.timer("checksum");
        let result = self.checksum(&self.by_path(path), algorithm).await;
        self.observe("checksum", result)
    }

    async fn verify_checksum(
        &self,
        document_id: Uuid,
        expected: &str,
        algorithm: &str,
    ) -> ContentResult<bool> {
        let _timer = self.timer("verify_checksum");
        let result = self
            .verify(&self.document(&document_id), expected, algorithm)
            .await;
        self.observe("verify_checksum", result)
    }

    async fn verify_checksum_by_path(
        &self,
        path: &str,
        expected: &str,
        algorithm: &str,
    ) -> ContentResult<bool> {
        let _timer = self.timer("verify_checksum");
        let result = self.verify(&self.by_path(path), expected, algorithm).await;
        self.observe("verify_checksum", result)
    }

    async fn health_check(&self) -> ContentResult<()> {
        let prefix = self.naming.prefix();
        let path = (!prefix.is_empty()).then(|| Path::from(prefix));
        let target = format!("prefix {}", prefix);
        let result = self
            .resilience
            .call("health_check", &target, || {
                let path = path.clone();
                let target = target.as_str();
                async move {
                    match self.store.list_with_delimiter(path.as_ref()).await {
                        Ok(_) | Err(object_store::Error::NotFound { .. }) => Ok(()),
                        Err(e) => Err(ContentError::backend("health_check", target, e)),
                    }
                }
            })
            .await;
        if result.is_ok() {
            debug!(store = %self.store, prefix, "content store is reachable");
        }
        self.observe("health_check", result)
    }

    fn adapter_name(&self) -> &'static str {
        ADAPTER_NAME
    }
}

#[cfg(test)]
mod tests {
    use object_store::memory::InMemory;

    use super::*;

    fn store_with(config: ContentStoreConfig) -> BlobContentStore {
        BlobContentStore::new(Arc::new(InMemory::new()), &config)
    }

    fn small_blocks() -> ContentStoreConfig {
        ContentStoreConfig {
            block_size: 1024,
            block_upload_threshold: 4096,
            ..ContentStoreConfig::in_memory()
        }
    }

    #[tokio::test]
    async fn test_store_returns_blob_name() {
        let store = store_with(ContentStoreConfig::in_memory());
        let id = Uuid::new_v4();
        let name = store
            .store_content(id, Bytes::from_static(b"hello"), Some("text/plain"))
            .await
            .unwrap();
        assert_eq!(name, format!("documents/{}.content", id));
        assert_eq!(
            store.get_content_by_path(&name).await.unwrap(),
            Bytes::from_static(b"hello")
        );
    }

    #[tokio::test]
    async fn test_rechunk_to_block_size() {
        let inner = stream::iter(vec![
            Ok(Bytes::from(vec![1u8; 700])),
            Ok(Bytes::from(vec![2u8; 700])),
            Ok(Bytes::from(vec![3u8; 100])),
        ])
        .boxed();
        let chunks: Vec<Bytes> = rechunk(
            inner,
            1024,
            Duration::from_secs(5),
            "get_stream",
            "document test".to_string(),
        )
        .map(|chunk| chunk.unwrap())
        .collect()
        .await;
        let sizes: Vec<usize> = chunks.iter().map(Bytes::len).collect();
        assert_eq!(sizes, vec![1024, 476]);
    }

    #[tokio::test]
    async fn test_chunked_store_round_trip() {
        let store = store_with(small_blocks());
        let id = Uuid::new_v4();
        let content: Bytes = (0..10_000u32).map(|i| (i % 251) as u8).collect::<Vec<_>>().into();
        store
            .store_content(id, content.clone(), None)
            .await
            .unwrap();
        assert_eq!(store.get_content(id).await.unwrap(), content);
        assert_eq!(store.get_content_size(id).await.unwrap(), 10_000);
    }

    #[test]
    fn test_single_upload_limit_scales_with_blocks() {
        let store = store_with(small_blocks());
        let call = store.resilience().timeout();
        assert_eq!(store.transfer_timeout(0), call);
        assert_eq!(store.transfer_timeout(1024), call);
        assert_eq!(store.transfer_timeout(1025), call * 2);
        assert_eq!(store.transfer_timeout(4096), call * 4);
    }

    #[tokio::test]
    async fn test_unknown_checksum_algorithm() {
        let store = store_with(ContentStoreConfig::in_memory());
        let err = store
            .calculate_checksum(Uuid::new_v4(), "CRC32")
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Checksum { .. }));
    }

    #[tokio::test]
    async fn test_health_check_on_empty_store() {
        let store = store_with(ContentStoreConfig::in_memory());
        store.health_check().await.unwrap();
        assert_eq!(store.adapter_name(), "AzureBlobDocumentContentAdapter");
    }
}
