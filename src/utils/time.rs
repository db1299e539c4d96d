use std::time::{Duration, Instant};

/// Longest step handed to animation in one frame. Larger gaps (debugger
/// breaks, window drags) are clamped so fades do not jump to completion.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Frame clock supplying per-frame deltas to the host loop.
pub struct Timer {
    start_time: Instant,
    last_update: Instant,
    /// Time since last tick, clamped to [`MAX_FRAME_DELTA`]
    pub delta: Duration,
    /// Total elapsed time since creation
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_update: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Starts a new frame and returns its delta in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.advance(now - self.last_update);
        self.last_update = now;
        self.elapsed = now - self.start_time;
        self.dt_seconds()
    }

    /// Advances by a fixed step instead of wall-clock time (headless runs).
    pub fn tick_fixed(&mut self, step: Duration) -> f32 {
        self.advance(step);
        self.elapsed += self.delta;
        self.dt_seconds()
    }

    fn advance(&mut self, delta: Duration) {
        self.delta = delta.min(MAX_FRAME_DELTA);
        self.frame_count += 1;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_ticks_accumulate_and_clamp() {
        let mut timer = Timer::new();
        let dt = timer.tick_fixed(Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-6);

        let dt = timer.tick_fixed(Duration::from_secs(3));
        assert!((dt - 0.25).abs() < 1e-6);
        assert_eq!(timer.frame_count, 2);
        assert_eq!(timer.elapsed, Duration::from_millis(266));
    }
}
