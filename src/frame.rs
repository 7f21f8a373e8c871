use crate::core::Clock;
use crate::traits::FrameSource;

/// Frame metadata - carries frame number and timing info
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub number: u64,
    /// Seconds since the source started
    pub time: f32,
    /// Seconds since the previous frame
    pub delta: f32,
}

impl FrameInfo {
    pub fn new(number: u64, time: f32, delta: f32) -> Self {
        Self { number, time, delta }
    }
}

/// Infinite iterator that yields wall-clock frame information
/// Use this in a loop: `for frame in frames { ... }`
pub struct FrameIterator {
    frame_number: u64,
    clock: Clock,
    last_delta: f32,
}

impl FrameIterator {
    pub fn new() -> Self {
        Self {
            frame_number: 0,
            clock: Clock::new(),
            last_delta: 0.0,
        }
    }
}

impl Default for FrameIterator {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for FrameIterator {
    type Item = FrameInfo;

    fn next(&mut self) -> Option<FrameInfo> {
        // delta is taken before elapsed so both describe the same instant
        let delta = self.clock.tick();
        let info = FrameInfo::new(self.frame_number, self.clock.elapsed_at_tick(), delta);

        self.frame_number += 1;
        self.last_delta = delta;

        Some(info)
    }
}

impl FrameSource for FrameIterator {
    fn delta_time(&self) -> f32 {
        self.last_delta
    }

    fn frame_count(&self) -> u64 {
        self.frame_number
    }
}

/// Synthetic frames with a constant step, optionally bounded.
///
/// Used by headless runs and tests so animation output does not depend on
/// how fast the host happens to be.
#[derive(Debug, Clone)]
pub struct FixedStepFrames {
    step: f32,
    limit: Option<u64>,
    frame_number: u64,
}

impl FixedStepFrames {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            limit: None,
            frame_number: 0,
        }
    }

    /// Stop after `frames` frames
    pub fn take_frames(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }

    /// 60 Hz steps
    pub fn sixty_hz() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl Iterator for FixedStepFrames {
    type Item = FrameInfo;

    fn next(&mut self) -> Option<FrameInfo> {
        if self.limit.is_some_and(|limit| self.frame_number >= limit) {
            return None;
        }
        let info = FrameInfo::new(self.frame_number, self.frame_number as f32 * self.step, self.step);
        self.frame_number += 1;
        Some(info)
    }
}

impl FrameSource for FixedStepFrames {
    fn delta_time(&self) -> f32 {
        self.step
    }

    fn frame_count(&self) -> u64 {
        self.frame_number
    }
}
