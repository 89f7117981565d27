// Timeline - Tempo and beat/time conversions
// Loop periods and pattern rescaling are both derived from the tempo

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tempo in BPM (Beats Per Minute), always a positive integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Tempo {
    bpm: u32,
}

impl Tempo {
    pub const MIN_BPM: u32 = 20;
    pub const MAX_BPM: u32 = 999;

    /// Creates a new tempo. Values outside [20, 999] are clamped.
    pub fn new(bpm: u32) -> Self {
        Self {
            bpm: bpm.clamp(Self::MIN_BPM, Self::MAX_BPM),
        }
    }

    /// Get BPM value
    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    /// Duration of one beat in milliseconds
    pub fn beat_duration_ms(&self) -> f64 {
        60_000.0 / self.bpm as f64
    }

    /// Duration of one beat in seconds
    pub fn beat_duration_seconds(&self) -> f64 {
        60.0 / self.bpm as f64
    }

    /// Milliseconds spanned by `beats` beats at this tempo
    pub fn beats_to_ms(&self, beats: f64) -> f64 {
        self.beat_duration_ms() * beats
    }

    /// Factor applied to times recorded at `recorded_bpm` when played back at
    /// this tempo. An unknown (zero) recording tempo plays unscaled.
    pub fn playback_scale(&self, recorded_bpm: u32) -> f64 {
        if recorded_bpm == 0 {
            1.0
        } else {
            recorded_bpm as f64 / self.bpm as f64
        }
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::new(90)
    }
}

impl From<u32> for Tempo {
    fn from(bpm: u32) -> Self {
        Self::new(bpm)
    }
}

impl From<Tempo> for u32 {
    fn from(tempo: Tempo) -> Self {
        tempo.bpm
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.bpm)
    }
}
