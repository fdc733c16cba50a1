//! snapcanvas
//!
//! A drawing canvas controller that captures mouse/touch strokes onto a fixed
//! pixel surface and periodically uploads a PNG snapshot of it to blob storage.
//!
//! # Features
//!
//! - **Explicit controller**: [`CanvasController`] owns the surface and the
//!   snapshot schedule; callers drive it with `on_tick` and `on_teardown`
//! - **Fire-and-forget uploads**: snapshots are encoded and submitted on
//!   background tasks; failures are logged and never interrupt drawing
//! - **Pluggable storage**: anything implementing [`BlobStore`] can receive
//!   snapshots (HTTP endpoint, local directory, in-memory)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use snapcanvas::{CanvasConfig, CanvasController, MemoryBlobStore, Point, PointerState};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryBlobStore::new());
//! let mut canvas = CanvasController::new(
//!     CanvasConfig::default(),
//!     store,
//!     tokio::runtime::Handle::current(),
//!     0,
//! )?;
//!
//! canvas.on_tick(&PointerState::mouse_down(Point::new(10.0, 10.0)), 16);
//! canvas.on_tick(&PointerState::mouse_down(Point::new(50.0, 40.0)), 32);
//! canvas.on_teardown();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod controller;
pub mod input;
pub mod rendering;
pub mod replay;
pub mod scheduler;
pub mod storage;
pub mod uploader;

pub use controller::{CanvasController, TickOutcome};
pub use image::Rgba;
pub use rendering::{PixelSurface, Screenshot};
pub use storage::{Access, BlobStore, FsBlobStore, HttpBlobStore, MemoryBlobStore, StoredObject};
pub use uploader::{SnapshotUploader, UploadStats};

/// Largest accepted surface side in pixels
pub const MAX_SURFACE_SIDE: u32 = 16_384;

/// Configuration for a canvas controller
///
/// The defaults describe the standard drawing widget: a 400x400 white
/// surface, a 4px black stroke and a snapshot every ten seconds.
///
/// # Examples
///
/// ```
/// let cfg = snapcanvas::CanvasConfig::default();
/// assert_eq!(cfg.viewport.width, 400);
/// assert_eq!(cfg.snapshot_interval_ms, 10_000);
/// ```
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    /// Surface dimensions
    pub viewport: Viewport,
    /// Stroke width in pixels
    pub stroke_width: f32,
    /// Stroke color
    pub stroke_color: Rgba<u8>,
    /// Background the surface is cleared to at creation
    pub background: Rgba<u8>,
    /// Minimum milliseconds between two snapshot attempts
    pub snapshot_interval_ms: u64,
    /// Object name prefix; names are `<prefix><epoch-ms>.png`
    pub name_prefix: String,
    /// Access level requested for uploaded snapshots
    pub access: Access,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            stroke_width: 4.0,
            stroke_color: Rgba([0, 0, 0, 255]),
            background: Rgba([255, 255, 255, 255]),
            snapshot_interval_ms: 10_000,
            name_prefix: "canvas_".to_string(),
            access: Access::Public,
        }
    }
}

impl CanvasConfig {
    /// Check the configuration for values the controller cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::ConfigError(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        let too_large = self.viewport.width > MAX_SURFACE_SIDE
            || self.viewport.height > MAX_SURFACE_SIDE
            || (self.viewport.width as usize)
                .checked_mul(self.viewport.height as usize)
                .and_then(|px| px.checked_mul(4))
                .is_none();
        if too_large {
            return Err(Error::ConfigError(format!(
                "viewport {}x{} exceeds the {}px per side limit",
                self.viewport.width, self.viewport.height, MAX_SURFACE_SIDE
            )));
        }
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(Error::ConfigError(format!(
                "stroke width must be positive, got {}",
                self.stroke_width
            )));
        }
        if self.snapshot_interval_ms == 0 {
            return Err(Error::ConfigError("snapshot interval must be non-zero".into()));
        }
        if self.name_prefix.is_empty() || self.name_prefix.contains('/') {
            return Err(Error::ConfigError(format!(
                "invalid name prefix '{}'",
                self.name_prefix
            )));
        }
        Ok(())
    }
}

/// Surface dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
        }
    }
}

/// A position in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Pointer input as observed at one tick
///
/// `touches` lists the active touch points in the order the platform reports
/// them; the first one is authoritative whenever any are present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointerState {
    /// Whether a mouse button is currently held
    pub mouse_pressed: bool,
    /// Last known mouse position
    pub mouse: Point,
    /// Active touch points
    pub touches: Vec<Point>,
}

impl PointerState {
    /// Mouse hovering at `pos` with no button held
    pub fn idle(pos: Point) -> Self {
        Self {
            mouse_pressed: false,
            mouse: pos,
            touches: Vec::new(),
        }
    }

    /// Mouse button held at `pos`
    pub fn mouse_down(pos: Point) -> Self {
        Self {
            mouse_pressed: true,
            mouse: pos,
            touches: Vec::new(),
        }
    }

    /// One or more active touches; the mouse position is left at the origin
    pub fn touch(points: Vec<Point>) -> Self {
        Self {
            mouse_pressed: false,
            mouse: Point::default(),
            touches: points,
        }
    }

    /// Whether a stroke should be drawn this tick
    pub fn is_active(&self) -> bool {
        self.mouse_pressed || !self.touches.is_empty()
    }

    /// The authoritative pointer position: first touch, else the mouse
    pub fn position(&self) -> Point {
        self.touches.first().copied().unwrap_or(self.mouse)
    }
}
