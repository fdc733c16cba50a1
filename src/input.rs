//! Input sampling: turns per-tick pointer state into stroke segments.

use crate::{Point, PointerState};

/// A stroke segment produced by one tick of active input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

/// Tracks the previously sampled pointer position across ticks.
///
/// The previous position is updated on every tick, active or not, so a new
/// stroke starts from wherever the pointer was last seen.
#[derive(Debug, Clone, Default)]
pub struct InputSampler {
    previous: Option<Point>,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position recorded at the last tick, if any tick has happened.
    pub fn previous(&self) -> Option<Point> {
        self.previous
    }

    /// Sample one tick. Returns the segment to draw when input is active.
    pub fn sample(&mut self, state: &PointerState) -> Option<Segment> {
        let current = state.position();
        let from = self.previous.unwrap_or(current);
        self.previous = Some(current);

        if state.is_active() {
            Some(Segment { from, to: current })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_input_draws_nothing_but_tracks_position() {
        let mut s = InputSampler::new();
        assert_eq!(s.sample(&PointerState::idle(Point::new(4.0, 4.0))), None);
        assert_eq!(s.previous(), Some(Point::new(4.0, 4.0)));

        let seg = s.sample(&PointerState::mouse_down(Point::new(8.0, 6.0))).unwrap();
        assert_eq!(seg.from, Point::new(4.0, 4.0));
        assert_eq!(seg.to, Point::new(8.0, 6.0));
    }

    #[test]
    fn first_tick_starts_at_current_position() {
        let mut s = InputSampler::new();
        let seg = s.sample(&PointerState::mouse_down(Point::new(3.0, 3.0))).unwrap();
        assert_eq!(seg.from, seg.to);
    }

    #[test]
    fn consecutive_segments_connect() {
        let mut s = InputSampler::new();
        let points = [Point::new(0.0, 0.0), Point::new(5.0, 1.0), Point::new(9.0, 7.0)];
        let segs: Vec<Segment> = points
            .iter()
            .filter_map(|p| s.sample(&PointerState::touch(vec![*p])))
            .collect();
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[1].from, segs[0].to);
        assert_eq!(segs[2].from, segs[1].to);
    }

    #[test]
    fn first_touch_wins_over_mouse() {
        let mut s = InputSampler::new();
        let state = PointerState {
            mouse_pressed: true,
            mouse: Point::new(100.0, 100.0),
            touches: vec![Point::new(1.0, 2.0), Point::new(50.0, 50.0)],
        };
        let seg = s.sample(&state).unwrap();
        assert_eq!(seg.to, Point::new(1.0, 2.0));
    }
}
