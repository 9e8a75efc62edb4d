//! Frame-cadence gate for live sources.
//!
//! Cameras deliver 30+ fps; the pipeline wants ~10. The throttle admits
//! at most one frame per interval and drops the rest — frames are never
//! queued, so processing always sees the freshest image.

use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct FrameThrottle {
    interval: Duration,
    last_admitted: Option<Instant>,
}

impl Default for FrameThrottle {
    /// ~10 Hz.
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl FrameThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_admitted: None,
        }
    }

    pub fn at_rate(hz: f32) -> Self {
        let hz = hz.max(0.001);
        Self::new(Duration::from_secs_f32(1.0 / hz))
    }

    /// Whether a frame arriving at `now` should be processed.
    ///
    /// Admission leaves no credit behind: a long gap admits exactly one
    /// frame, not a burst.
    pub fn admit(&mut self, now: Instant) -> bool {
        match self.last_admitted {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_admitted = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_admitted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_always_admitted() {
        let mut throttle = FrameThrottle::default();
        assert!(throttle.admit(Instant::now()));
    }

    #[test]
    fn fast_frames_are_dropped() {
        let mut throttle = FrameThrottle::new(Duration::from_millis(100));
        let t0 = Instant::now();
        assert!(throttle.admit(t0));
        assert!(!throttle.admit(t0 + Duration::from_millis(30)));
        assert!(!throttle.admit(t0 + Duration::from_millis(99)));
        assert!(throttle.admit(t0 + Duration::from_millis(100)));
    }

    #[test]
    fn a_long_gap_earns_no_burst_credit() {
        let mut throttle = FrameThrottle::new(Duration::from_millis(100));
        let t0 = Instant::now();
        assert!(throttle.admit(t0));
        assert!(throttle.admit(t0 + Duration::from_millis(450)));
        assert!(!throttle.admit(t0 + Duration::from_millis(460)));
    }

    #[test]
    fn reset_reopens_the_gate() {
        let mut throttle = FrameThrottle::new(Duration::from_millis(100));
        let t0 = Instant::now();
        assert!(throttle.admit(t0));
        throttle.reset();
        assert!(throttle.admit(t0 + Duration::from_millis(1)));
    }
}
