//! The document content port: what a document-management caller needs from
//! a content backend.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use uuid::Uuid;

use crate::ContentResult;

/// A boxed stream of content chunks.
pub type ByteStream = BoxStream<'static, ContentResult<Bytes>>;

/// Content operations addressed by document identifier, or by an explicit
/// storage path for the `*_by_path` variants.
///
/// Store operations return the blob name the content was written to. Callers
/// persist it; for identifier-addressed content it is always
/// `{path_prefix}{document_id}.content`.
#[async_trait]
pub trait DocumentContentPort: Send + Sync {
    async fn store_content(
        &self,
        document_id: Uuid,
        content: Bytes,
        mime_type: Option<&str>,
    ) -> ContentResult<String>;

    /// Store content from a stream without materializing payloads larger
    /// than the block upload threshold.
    async fn store_content_stream(
        &self,
        document_id: Uuid,
        content: ByteStream,
        mime_type: Option<&str>,
        content_length: Option<u64>,
    ) -> ContentResult<String>;

    async fn get_content(&self, document_id: Uuid) -> ContentResult<Bytes>;

    /// Open the blob and stream it in block-sized chunks. Dropping the
    /// stream releases the backend read handle.
    async fn get_content_stream(&self, document_id: Uuid) -> ContentResult<ByteStream>;

    /// Read `length` bytes starting at `offset`. Ranges past the end are
    /// truncated to the available bytes.
    async fn get_content_range(
        &self,
        document_id: Uuid,
        offset: u64,
        length: u64,
    ) -> ContentResult<Bytes>;

    async fn exists_content(&self, document_id: Uuid) -> ContentResult<bool>;

    async fn get_content_size(&self, document_id: Uuid) -> ContentResult<u64>;

    /// Idempotent: deleting missing content succeeds.
    async fn delete_content(&self, document_id: Uuid) -> ContentResult<()>;

    async fn store_content_by_path(
        &self,
        path: &str,
        content: Bytes,
        mime_type: Option<&str>,
    ) -> ContentResult<String>;

    async fn store_content_stream_by_path(
        &self,
        path: &str,
        content: ByteStream,
        mime_type: Option<&str>,
        content_length: Option<u64>,
    ) -> ContentResult<String>;

    async fn get_content_by_path(&self, path: &str) -> ContentResult<Bytes>;

    async fn get_content_stream_by_path(&self, path: &str) -> ContentResult<ByteStream>;

    async fn get_content_range_by_path(
        &self,
        path: &str,
        offset: u64,
        length: u64,
    ) -> ContentResult<Bytes>;

    async fn exists_content_by_path(&self, path: &str) -> ContentResult<bool>;

    async fn get_content_size_by_path(&self, path: &str) -> ContentResult<u64>;

    async fn delete_content_by_path(&self, path: &str) -> ContentResult<()>;

    /// Lowercase hex digest of the content. `algorithm` is e.g. `SHA-256`.
    async fn calculate_checksum(&self, document_id: Uuid, algorithm: &str)
        -> ContentResult<String>;

    async fn calculate_checksum_by_path(&self, path: &str, algorithm: &str)
        -> ContentResult<String>;

    /// Case-insensitive comparison against the computed checksum.
    async fn verify_checksum(
        &self,
        document_id: Uuid,
        expected: &str,
        algorithm: &str,
    ) -> ContentResult<bool>;

    async fn verify_checksum_by_path(
        &self,
        path: &str,
        expected: &str,
        algorithm: &str,
    ) -> ContentResult<bool>;

    /// Verify the backend is reachable.
    async fn health_check(&self) -> ContentResult<()>;

    fn adapter_name(&self) -> &'static str;
}
