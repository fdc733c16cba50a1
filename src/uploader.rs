//! Snapshot uploading: encode a frozen copy of the surface and hand it to the
//! storage collaborator on a background task.
//!
//! Uploads are best-effort, non-blocking and non-cancelable. Each call spawns
//! an independent task; overlapping uploads are allowed and may finish in any
//! order. Any failure (encoding or storage) is logged and dropped.

use crate::rendering::Screenshot;
use crate::storage::{Access, BlobStore, StoredObject};
use crate::{Error, Result};
use futures::FutureExt;
use image::RgbaImage;
use log::{debug, error, info, warn};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Counters shared between the uploader and its background tasks.
#[derive(Debug, Default)]
pub struct UploadStats {
    started: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    in_flight: AtomicUsize,
    idle: Notify,
}

impl UploadStats {
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Wait until no upload is in flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn begin(&self) -> usize {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn finish(&self, ok: bool) {
        if ok {
            self.succeeded.fetch_add(1, Ordering::SeqCst);
        } else {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Generates `<prefix><epoch-ms>.png` names, unique per call.
///
/// When two names are requested within the same millisecond the later one is
/// bumped forward so the embedded timestamps are strictly increasing.
#[derive(Debug)]
pub struct SnapshotNamer {
    prefix: String,
    last_ms: AtomicU64,
}

impl SnapshotNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            last_ms: AtomicU64::new(0),
        }
    }

    pub fn next(&self, epoch_ms: u64) -> String {
        let prev = self
            .last_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| {
                Some(if epoch_ms > prev { epoch_ms } else { prev + 1 })
            })
            .unwrap_or_else(|prev| prev);
        let ms = if epoch_ms > prev { epoch_ms } else { prev + 1 };
        format!("{}{}.png", self.prefix, ms)
    }
}

/// Milliseconds since the Unix epoch by the wall clock.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Submits snapshots to a [`BlobStore`] in the background.
pub struct SnapshotUploader {
    store: Arc<dyn BlobStore>,
    runtime: Handle,
    namer: SnapshotNamer,
    access: Access,
    stats: Arc<UploadStats>,
}

impl SnapshotUploader {
    pub fn new(store: Arc<dyn BlobStore>, runtime: Handle, name_prefix: &str, access: Access) -> Self {
        Self {
            store,
            runtime,
            namer: SnapshotNamer::new(name_prefix),
            access,
            stats: Arc::new(UploadStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<UploadStats> {
        Arc::clone(&self.stats)
    }

    /// Spawn an upload of `image`.
    ///
    /// The returned handle may be dropped; the task keeps running detached.
    /// It resolves to the stored object, or `None` when the upload failed.
    pub fn upload(&self, image: RgbaImage) -> JoinHandle<Option<StoredObject>> {
        let name = self.namer.next(epoch_millis());
        let store = Arc::clone(&self.store);
        let stats = Arc::clone(&self.stats);
        let access = self.access;

        let in_flight = stats.begin();
        if in_flight > 1 {
            warn!("Starting upload {} while {} other upload(s) are in flight", name, in_flight - 1);
        } else {
            debug!("Starting upload {}", name);
        }

        self.runtime.spawn(async move {
            let work = AssertUnwindSafe(encode_and_put(store.as_ref(), &name, image, access));
            let outcome = work
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(Error::Other(format!("upload panicked: {}", panic_message(&*payload)))));
            match outcome {
                Ok(obj) => {
                    info!("Canvas saved to: {}", obj.url);
                    stats.finish(true);
                    Some(obj)
                }
                Err(e) => {
                    error!("Error saving canvas {}: {}", name, e);
                    stats.finish(false);
                    None
                }
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

async fn encode_and_put(store: &dyn BlobStore, name: &str, image: RgbaImage, access: Access) -> Result<StoredObject> {
    let shot = tokio::task::spawn_blocking(move || Screenshot::encode(&image))
        .await
        .map_err(|e| Error::RenderError(format!("encode task failed: {}", e)))??;
    store.put(name, shot.png_data, access).await
}
