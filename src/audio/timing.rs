// Audio timing - Frame counter used as the session clock
// The output callback (or the offline renderer) advances the counter after
// every rendered block, so scheduled notes and rendered audio share one
// timeline.

use crate::scheduler::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared frame position of the render loop
#[derive(Debug, Clone)]
pub struct AudioTiming {
    /// Frames rendered so far (incremented by the render loop)
    frame_position: Arc<AtomicU64>,
    sample_rate: u32,
}

impl AudioTiming {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frame_position: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn current_frame(&self) -> u64 {
        self.frame_position.load(Ordering::Relaxed)
    }

    /// Advance by one rendered block
    pub fn advance(&self, frames: usize) {
        self.frame_position
            .fetch_add(frames as u64, Ordering::Relaxed);
    }

    pub fn frames_to_seconds(&self, frames: u64) -> f64 {
        frames as f64 / self.sample_rate as f64
    }

    pub fn seconds_to_frames(&self, seconds: f64) -> u64 {
        (seconds.max(0.0) * self.sample_rate as f64) as u64
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Clock for AudioTiming {
    fn now(&self) -> f64 {
        self.frames_to_seconds(self.current_frame())
    }
}
