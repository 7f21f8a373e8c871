use std::time::Instant;

/// Minimal frame clock - tracks delta and elapsed time
#[derive(Debug)]
pub struct Clock {
    start: Instant,
    last_tick: Instant,
}

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
        }
    }

    /// Get delta time since last tick and advance clock
    /// Returns delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta
    }

    /// Seconds from start to the most recent tick
    pub fn elapsed_at_tick(&self) -> f32 {
        self.last_tick.duration_since(self.start).as_secs_f32()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn clock_measures_delta() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        let delta = clock.tick();

        // Should be at least 10ms
        assert!(delta >= 0.009);
        assert!((clock.elapsed_at_tick() - delta).abs() < 1e-6);
    }
}
