//! The canvas controller: one surface, one snapshot schedule, one uploader.
//!
//! Callers drive the controller from their render loop. Every tick first
//! checks the snapshot schedule and then draws the pointer segment, if any.
//! Tearing the controller down (explicitly or by dropping it) issues one final
//! best-effort upload.

use crate::input::{InputSampler, Segment};
use crate::rendering::{PaintCommand, PixelSurface};
use crate::scheduler::SnapshotScheduler;
use crate::storage::{BlobStore, StoredObject};
use crate::uploader::{SnapshotUploader, UploadStats};
use crate::{CanvasConfig, PointerState, Result};
use log::{debug, info};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickOutcome {
    /// Segment drawn this tick, when input was active
    pub segment: Option<Segment>,
    /// Whether a snapshot upload was started this tick
    pub snapshot_triggered: bool,
}

pub struct CanvasController {
    config: CanvasConfig,
    surface: PixelSurface,
    sampler: InputSampler,
    scheduler: SnapshotScheduler,
    uploader: SnapshotUploader,
    torn_down: bool,
}

impl CanvasController {
    /// Create a controller whose snapshot clock starts at `now_ms`.
    ///
    /// `now_ms` and later tick times come from the same monotonic clock;
    /// only their differences matter.
    pub fn new(config: CanvasConfig, store: Arc<dyn BlobStore>, runtime: Handle, now_ms: u64) -> Result<Self> {
        config.validate()?;

        let surface = PixelSurface::new(config.viewport, config.background);
        let scheduler = SnapshotScheduler::new(config.snapshot_interval_ms, now_ms);
        let uploader = SnapshotUploader::new(store, runtime, &config.name_prefix, config.access);

        debug!(
            "Canvas created: {}x{}, snapshot every {}ms",
            config.viewport.width, config.viewport.height, config.snapshot_interval_ms
        );

        Ok(Self {
            config,
            surface,
            sampler: InputSampler::new(),
            scheduler,
            uploader,
            torn_down: false,
        })
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    pub fn last_snapshot_ms(&self) -> u64 {
        self.scheduler.last_snapshot_ms()
    }

    pub fn stats(&self) -> Arc<UploadStats> {
        self.uploader.stats()
    }

    /// Advance one tick with the pointer state observed at `now_ms`.
    pub fn on_tick(&mut self, pointer: &PointerState, now_ms: u64) -> TickOutcome {
        let snapshot_triggered = self.scheduler.poll(now_ms);
        if snapshot_triggered {
            debug!("Snapshot interval elapsed at {}ms", now_ms);
            // Detached: the upload outlives this tick and is never awaited here.
            drop(self.snapshot());
        }

        let segment = self.sampler.sample(pointer);
        if let Some(seg) = segment {
            self.surface.apply(&PaintCommand::line(
                seg.from,
                seg.to,
                self.config.stroke_width,
                self.config.stroke_color,
            ));
        }

        TickOutcome {
            segment,
            snapshot_triggered,
        }
    }

    /// Start an upload of the current surface outside the regular schedule.
    ///
    /// Does not touch the snapshot clock.
    pub fn snapshot(&self) -> JoinHandle<Option<StoredObject>> {
        self.uploader.upload(self.surface.snapshot())
    }

    /// Tear the controller down, issuing one final best-effort upload.
    ///
    /// Dropping the controller has the same effect; the final upload is
    /// issued only once either way.
    pub fn on_teardown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        info!("Canvas torn down; issuing final snapshot");
        drop(self.snapshot());
    }
}

impl Drop for CanvasController {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;
    use crate::{Point, Rgba, Viewport};

    fn small_config() -> CanvasConfig {
        CanvasConfig {
            viewport: Viewport { width: 64, height: 64 },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn ticks_draw_and_schedule() {
        let store = Arc::new(MemoryBlobStore::new());
        let mut c = CanvasController::new(small_config(), store.clone(), Handle::current(), 0).unwrap();
        assert_eq!(c.config().viewport.width, 64);
        assert_eq!(c.surface().width(), 64);

        let out = c.on_tick(&PointerState::mouse_down(Point::new(10.0, 10.0)), 16);
        assert!(out.segment.is_some());
        assert!(!out.snapshot_triggered);
        assert_eq!(c.surface().pixel(10, 10), Some(Rgba([0, 0, 0, 255])));

        let out = c.on_tick(&PointerState::idle(Point::new(40.0, 40.0)), 10_001);
        assert!(out.segment.is_none());
        assert!(out.snapshot_triggered);
        assert_eq!(c.last_snapshot_ms(), 10_001);

        let stats = c.stats();
        stats.wait_idle().await;
        assert_eq!(stats.succeeded(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let cfg = CanvasConfig {
            snapshot_interval_ms: 0,
            ..Default::default()
        };
        let res = CanvasController::new(cfg, Arc::new(MemoryBlobStore::new()), Handle::current(), 0);
        assert!(res.is_err());

        let huge = CanvasConfig {
            viewport: Viewport { width: u32::MAX, height: u32::MAX },
            ..Default::default()
        };
        let res = CanvasController::new(huge, Arc::new(MemoryBlobStore::new()), Handle::current(), 0);
        assert!(matches!(res, Err(crate::Error::ConfigError(_))));
    }

    #[tokio::test]
    async fn drop_uploads_once() {
        let store = Arc::new(MemoryBlobStore::new());
        let c = CanvasController::new(small_config(), store.clone(), Handle::current(), 0).unwrap();
        let stats = c.stats();
        drop(c);
        stats.wait_idle().await;
        assert_eq!(stats.started(), 1);
        assert_eq!(store.len(), 1);
    }
}
