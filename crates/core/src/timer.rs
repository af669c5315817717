//! Frame timing.

use std::time::{Duration, Instant};

/// Wall-clock timer driving per-frame delta time.
#[derive(Debug)]
pub struct FrameTimer {
    start: Instant,
    last_tick: Instant,
}

impl FrameTimer {
    /// Create a timer starting now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
        }
    }

    /// Time since the last `tick()`, advancing the tick point.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now - self.last_tick;
        self.last_tick = now;
        delta
    }

    /// Delta time in seconds since the last tick.
    pub fn delta_secs(&mut self) -> f32 {
        self.tick().as_secs_f32()
    }

    /// Seconds since the timer was created.
    pub fn elapsed_secs(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_advances() {
        let mut timer = FrameTimer::new();
        std::thread::sleep(Duration::from_millis(5));
        let first = timer.tick();
        assert!(first >= Duration::from_millis(5));
        // Second tick measures from the first tick, not from creation.
        let second = timer.tick();
        assert!(second < first);
    }

    #[test]
    fn delta_is_non_negative() {
        let mut timer = FrameTimer::new();
        assert!(timer.delta_secs() >= 0.0);
        assert!(timer.elapsed_secs() >= 0.0);
    }
}
