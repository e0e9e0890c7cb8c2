//! Frame timing for the render loop.

use instant::{Duration, Instant};

/// Measures per-frame deltas and drives an optional fixed-rate tick.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last_time: Instant,
    time_since_tick: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_time: now,
            time_since_tick: Duration::from_millis(0),
        }
    }

    /// Time since the previous call (or since construction).
    pub fn tick(&mut self) -> Duration {
        let dt = self.last_time.elapsed();
        self.last_time = Instant::now();
        self.time_since_tick += dt;
        dt
    }

    /// Total time since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// `true` once at least `period` has accumulated across ticks; resets the
    /// accumulator when it fires.
    pub fn tick_due(&mut self, period: Duration) -> bool {
        if self.time_since_tick >= period {
            self.time_since_tick = Duration::from_millis(0);
            true
        } else {
            false
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
