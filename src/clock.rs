use std::time::{Duration, Instant};

/// Frame scheduler for the terminal host.
///
/// A frame only runs if the previous one asked for it with [`FrameClock::request`].
/// Timestamps are milliseconds since the clock was created.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    frame_dt: Duration,
    next_deadline: Instant,
    pending: bool,
}

impl FrameClock {
    pub fn new(fps_cap: u32) -> Self {
        let start = Instant::now();
        Self {
            start,
            frame_dt: Duration::from_secs_f64(1.0 / fps_cap.max(1) as f64),
            next_deadline: start,
            // the first frame is always scheduled
            pending: true,
        }
    }

    pub fn request(&mut self) {
        self.pending = true;
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Sleeps until the next frame slot and returns its timestamp, or `None`
    /// if no frame was requested.
    pub fn next_frame(&mut self) -> Option<f64> {
        if !std::mem::take(&mut self.pending) {
            return None;
        }
        let now = Instant::now();
        if now < self.next_deadline {
            std::thread::sleep(self.next_deadline - now);
        }
        let now = Instant::now();
        // fall behind instead of bursting to catch up
        self.next_deadline = (self.next_deadline + self.frame_dt).max(now);
        Some(now.duration_since(self.start).as_secs_f64() * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_runs_without_request() {
        let mut c = FrameClock::new(60);
        assert!(c.next_frame().is_some());
        assert!(c.next_frame().is_none());
    }

    #[test]
    fn timestamps_are_monotonic_and_paced() {
        let mut c = FrameClock::new(100);
        let t0 = c.next_frame().unwrap();
        c.request();
        let t1 = c.next_frame().unwrap();
        c.request();
        let t2 = c.next_frame().unwrap();
        assert!(t0 <= t1 && t1 <= t2);
        assert!(t2 - t0 >= 9.0, "frames not paced: {t0} {t1} {t2}");
    }

    #[test]
    fn cancel_drops_the_pending_frame() {
        let mut c = FrameClock::new(30);
        c.cancel();
        assert!(c.next_frame().is_none());
    }
}
