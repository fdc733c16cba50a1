//! Pointer-event scripts and their replay through a controller.
//!
//! A script is JSON lines, one pointer sample per tick:
//!
//! ```text
//! {"t": 0, "pressed": true, "mouse": [10, 10]}
//! {"t": 16, "pressed": true, "mouse": [12, 14]}
//! {"t": 32, "touches": [[40, 40], [90, 90]]}
//! ```
//!
//! `mouse` is optional and sticks from the previous sample; `pressed` and
//! `touches` default to released/empty. Blank lines and lines starting with
//! `#` are ignored. Times must not go backwards.

use crate::controller::CanvasController;
use crate::input::InputSampler;
use crate::rendering::{PaintCommand, PixelSurface};
use crate::{CanvasConfig, Error, Point, PointerState, Result};
use serde::Deserialize;

/// One tick of recorded pointer input
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PointerSample {
    /// Tick time in milliseconds
    pub t: u64,
    #[serde(default)]
    pub pressed: bool,
    #[serde(default)]
    pub mouse: Option<[f32; 2]>,
    #[serde(default)]
    pub touches: Vec<[f32; 2]>,
}

/// Parse a JSON-lines pointer script.
pub fn parse_script(text: &str) -> Result<Vec<PointerSample>> {
    let mut samples: Vec<PointerSample> = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let sample: PointerSample = serde_json::from_str(trimmed).map_err(|e| Error::InputError {
            line: line_no,
            reason: e.to_string(),
        })?;
        if let Some(prev) = samples.last() {
            if sample.t < prev.t {
                return Err(Error::InputError {
                    line: line_no,
                    reason: format!("time {} goes backwards from {}", sample.t, prev.t),
                });
            }
        }
        samples.push(sample);
    }
    Ok(samples)
}

/// Turns samples into pointer states, carrying the mouse position forward.
#[derive(Debug, Default)]
struct StateTracker {
    mouse: Point,
}

impl StateTracker {
    fn state(&mut self, s: &PointerSample) -> PointerState {
        if let Some([x, y]) = s.mouse {
            self.mouse = Point::new(x, y);
        }
        PointerState {
            mouse_pressed: s.pressed,
            mouse: self.mouse,
            touches: s.touches.iter().map(|[x, y]| Point::new(*x, *y)).collect(),
        }
    }
}

/// Counts collected while replaying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaySummary {
    pub ticks: usize,
    pub segments: usize,
    pub snapshots: usize,
}

/// Feed every sample to `controller` as one tick.
pub fn replay(controller: &mut CanvasController, samples: &[PointerSample]) -> ReplaySummary {
    let mut tracker = StateTracker::default();
    let mut summary = ReplaySummary::default();
    for s in samples {
        let out = controller.on_tick(&tracker.state(s), s.t);
        summary.ticks += 1;
        if out.segment.is_some() {
            summary.segments += 1;
        }
        if out.snapshot_triggered {
            summary.snapshots += 1;
        }
    }
    summary
}

/// Draw the strokes of `samples` onto a fresh surface without any uploads.
pub fn render(config: &CanvasConfig, samples: &[PointerSample]) -> Result<PixelSurface> {
    config.validate()?;
    let mut surface = PixelSurface::new(config.viewport, config.background);
    let mut sampler = InputSampler::new();
    let mut tracker = StateTracker::default();
    for s in samples {
        if let Some(seg) = sampler.sample(&tracker.state(s)) {
            surface.apply(&PaintCommand::line(seg.from, seg.to, config.stroke_width, config.stroke_color));
        }
    }
    Ok(surface)
}
