//! Snapshot scheduling: a polled, fixed-interval trigger.

/// Decides at which ticks a snapshot should be attempted.
///
/// The check only runs when polled, so the real interval may overshoot the
/// threshold by up to one tick. The last-snapshot timestamp never moves
/// backwards, even if a caller passes a clock reading older than it.
#[derive(Debug, Clone)]
pub struct SnapshotScheduler {
    last_snapshot_ms: u64,
    interval_ms: u64,
}

impl SnapshotScheduler {
    pub fn new(interval_ms: u64, now_ms: u64) -> Self {
        Self {
            last_snapshot_ms: now_ms,
            interval_ms,
        }
    }

    pub fn last_snapshot_ms(&self) -> u64 {
        self.last_snapshot_ms
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Returns true when more than the interval has elapsed since the last
    /// attempt, and records `now_ms` as the new attempt time.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let elapsed = now_ms.saturating_sub(self.last_snapshot_ms);
        if elapsed > self.interval_ms {
            self.last_snapshot_ms = now_ms;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggers_only_after_threshold_is_exceeded() {
        let mut s = SnapshotScheduler::new(10_000, 0);
        assert_eq!(s.interval_ms(), 10_000);
        assert!(!s.poll(5_000));
        assert!(!s.poll(10_000));
        assert!(s.poll(10_001));
        assert_eq!(s.last_snapshot_ms(), 10_001);
        assert!(!s.poll(20_001));
        assert!(s.poll(20_002));
    }

    #[test]
    fn one_trigger_per_crossing_with_coarse_ticks() {
        let mut s = SnapshotScheduler::new(10_000, 0);
        let fired: Vec<u64> = (0..=60_000u64)
            .step_by(7_000)
            .filter(|t| s.poll(*t))
            .collect();
        assert_eq!(fired, vec![14_000, 28_000, 42_000, 56_000]);
    }

    #[test]
    fn stale_clock_reading_never_rewinds() {
        let mut s = SnapshotScheduler::new(10_000, 50_000);
        assert!(!s.poll(1_000));
        assert_eq!(s.last_snapshot_ms(), 50_000);
    }
}
