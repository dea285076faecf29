//! Frame-rate pacing for the redraw loop

use std::time::{Duration, Instant};

/// Computes redraw deadlines for a fixed target frame rate.
///
/// The event loop waits until [`FramePacer::deadline`] and then requests a
/// redraw. After each presented frame, [`FramePacer::frame_presented`] moves the
/// deadline one interval forward. If rendering fell behind, the deadline
/// restarts from `now` so that the loop never tries to catch up in bursts.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Option<Duration>,
    deadline: Instant,
    frame_index: u64,
}

impl FramePacer {
    /// A `target_fps` of 0 disables pacing.
    pub fn new(target_fps: u32, now: Instant) -> Self {
        let interval = (target_fps > 0).then(|| Duration::from_secs_f64(1.0 / target_fps as f64));
        Self {
            interval,
            deadline: now,
            frame_index: 0,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// `None` when pacing is disabled
    pub fn deadline(&self) -> Option<Instant> {
        self.interval.map(|_| self.deadline)
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Whether a redraw should be requested at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        self.interval.is_none() || now >= self.deadline
    }

    pub fn frame_presented(&mut self, now: Instant) {
        self.frame_index += 1;
        if let Some(interval) = self.interval {
            let next = self.deadline + interval;
            self.deadline = if next < now { now } else { next };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_advances_by_interval() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(60, start);
        let interval = pacer.interval().expect("pacing enabled");

        assert!(pacer.is_due(start));
        pacer.frame_presented(start);
        assert_eq!(pacer.deadline(), Some(start + interval));
        assert!(!pacer.is_due(start));
        assert!(pacer.is_due(start + interval));
        assert_eq!(pacer.frame_index(), 1);
    }

    #[test]
    fn test_deadline_never_falls_behind_now() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(60, start);

        // A stall of one second
        let late = start + Duration::from_secs(1);
        pacer.frame_presented(late);
        assert_eq!(pacer.deadline(), Some(late));
    }

    #[test]
    fn test_zero_fps_disables_pacing() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(0, start);
        assert!(pacer.interval().is_none());
        assert!(pacer.deadline().is_none());
        pacer.frame_presented(start);
        assert!(pacer.is_due(start));
    }
}
