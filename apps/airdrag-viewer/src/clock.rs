use std::time::{Duration, Instant};

/// Frame timing owned by the event loop.
///
/// Camera motion is per tick, so the clock only measures; it does not scale
/// anything. Frame rate is logged at debug level once per `log_every`.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frames: u64,
    window_start: Instant,
    window_frames: u32,
    log_every: Duration,
}

impl FrameClock {
    pub fn new(now: Instant) -> Self {
        Self {
            start: now,
            last: now,
            frames: 0,
            window_start: now,
            window_frames: 0,
            log_every: Duration::from_secs(1),
        }
    }

    /// Advance one frame. Returns the time since the previous tick.
    pub fn tick_at(&mut self, now: Instant) -> Duration {
        let dt = now.saturating_duration_since(self.last);
        self.last = now;
        self.frames += 1;
        self.window_frames += 1;

        let window = now.saturating_duration_since(self.window_start);
        if window >= self.log_every {
            let fps = f64::from(self.window_frames) / window.as_secs_f64();
            tracing::debug!(frames = self.frames, fps = format_args!("{fps:.1}"), "frame rate");
            self.window_start = now;
            self.window_frames = 0;
        }
        dt
    }

    pub fn tick(&mut self) -> Duration {
        self.tick_at(Instant::now())
    }

    /// Frames ticked so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn elapsed(&self) -> Duration {
        self.last.saturating_duration_since(self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_reports_time_since_previous_frame() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(t0);
        assert_eq!(clock.tick_at(t0 + Duration::from_millis(16)), Duration::from_millis(16));
        assert_eq!(clock.tick_at(t0 + Duration::from_millis(40)), Duration::from_millis(24));
        assert_eq!(clock.frames(), 2);
        assert_eq!(clock.elapsed(), Duration::from_millis(40));
    }

    #[test]
    fn clock_never_runs_backwards() {
        let t0 = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::new(t0);
        assert_eq!(clock.tick_at(t0 - Duration::from_millis(5)), Duration::ZERO);
        assert_eq!(clock.frames(), 1);
    }

    #[test]
    fn independent_clocks_do_not_share_state() {
        let t0 = Instant::now();
        let mut a = FrameClock::new(t0);
        let b = FrameClock::new(t0);
        a.tick_at(t0 + Duration::from_millis(10));
        assert_eq!(a.frames(), 1);
        assert_eq!(b.frames(), 0);
    }
}
