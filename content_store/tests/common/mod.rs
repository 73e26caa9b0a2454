use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{
    stream::{self, BoxStream},
    StreamExt,
    TryStreamExt,
};
use object_store::{
    memory::InMemory,
    path::Path,
    GetOptions,
    GetResult,
    GetResultPayload,
    ListResult,
    MultipartUpload,
    ObjectMeta,
    ObjectStore,
    PutMultipartOpts,
    PutOptions,
    PutPayload,
    PutResult,
    Result,
};

/// Size of the pieces read bodies are served in.
#[allow(dead_code)]
pub const BODY_CHUNK: usize = 1024;

/// In-memory backend that counts calls and fails on demand. Read bodies are
/// served in `BODY_CHUNK` pieces.
#[derive(Debug, Default)]
pub struct FaultyStore {
    pub inner: InMemory,
    failing: AtomicBool,
    fail_next: AtomicUsize,
    read_delay_ms: AtomicU64,
    pub calls: AtomicUsize,
    pub puts: AtomicUsize,
    pub multipart_puts: AtomicUsize,
    pub reads: AtomicUsize,
    pub deletes: AtomicUsize,
    /// Body pieces handed to readers.
    pub body_chunks: Arc<AtomicUsize>,
    /// Read bodies not yet dropped.
    pub open_bodies: Arc<AtomicUsize>,
}

/// Decrements the open body count when the body stream is dropped.
struct BodyGuard(Arc<AtomicUsize>);

impl Drop for BodyGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[allow(dead_code)]
impl FaultyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail every call until switched off.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Fail only the next `n` calls.
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Delay every body piece by `delay`.
    pub fn set_read_delay(&self, delay: Duration) {
        self.read_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self, counter: &AtomicUsize) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        counter.fetch_add(1, Ordering::SeqCst);
        let injected = self.failing.load(Ordering::SeqCst)
            || self
                .fail_next
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
        if injected {
            return Err(object_store::Error::Generic {
                store: "FaultyStore",
                source: "injected failure".into(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for FaultyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FaultyStore({})", self.inner)
    }
}

#[async_trait]
impl ObjectStore for FaultyStore {
    async fn put_opts(
        &self,
        location: &Path,
        payload: PutPayload,
        opts: PutOptions,
    ) -> Result<PutResult> {
        self.enter(&self.puts)?;
        self.inner.put_opts(location, payload, opts).await
    }

    async fn put_multipart_opts(
        &self,
        location: &Path,
        opts: PutMultipartOpts,
    ) -> Result<Box<dyn MultipartUpload>> {
        self.enter(&self.multipart_puts)?;
        self.inner.put_multipart_opts(location, opts).await
    }

    async fn get_opts(&self, location: &Path, options: GetOptions) -> Result<GetResult> {
        self.enter(&self.reads)?;
        let result = self.inner.get_opts(location, options).await?;
        let GetResult {
            meta,
            range,
            attributes,
            payload,
        } = result;
        let body = match payload {
            GetResultPayload::Stream(body) => body,
            GetResultPayload::File(..) => unreachable!("in-memory reads are streamed"),
        };

        let delay = Duration::from_millis(self.read_delay_ms.load(Ordering::SeqCst));
        let pulled = self.body_chunks.clone();
        self.open_bodies.fetch_add(1, Ordering::SeqCst);
        let guard = BodyGuard(self.open_bodies.clone());
        let body = body
            .map_ok(|data| {
                let pieces: Vec<Result<Bytes>> = (0..data.len())
                    .step_by(BODY_CHUNK)
                    .map(|at| Ok(data.slice(at..(at + BODY_CHUNK).min(data.len()))))
                    .collect();
                stream::iter(pieces)
            })
            .try_flatten()
            .then(move |piece| {
                let pulled = pulled.clone();
                async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    pulled.fetch_add(1, Ordering::SeqCst);
                    piece
                }
            })
            .map(move |piece| {
                let _guard = &guard;
                piece
            })
            .boxed();

        Ok(GetResult {
            payload: GetResultPayload::Stream(body),
            meta,
            range,
            attributes,
        })
    }

    async fn delete(&self, location: &Path) -> Result<()> {
        self.enter(&self.deletes)?;
        self.inner.delete(location).await
    }

    fn list(&self, prefix: Option<&Path>) -> BoxStream<'static, Result<ObjectMeta>> {
        self.inner.list(prefix)
    }

    async fn list_with_delimiter(&self, prefix: Option<&Path>) -> Result<ListResult> {
        self.enter(&self.reads)?;
        self.inner.list_with_delimiter(prefix).await
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        self.inner.copy(from, to).await
    }

    async fn copy_if_not_exists(&self, from: &Path, to: &Path) -> Result<()> {
        self.inner.copy_if_not_exists(from, to).await
    }
}
