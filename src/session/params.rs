// Performance parameters - Live controls read by the generators on every step

use crate::generator::{ChordParams, DurationWeights, IntervalWeights, WalkParams};
use crate::sequencer::Tempo;
use crate::theory::{Mode, NoteRange, Pitch, PitchClass, scale_notes};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceParams {
    pub tempo: Tempo,
    /// Dynamic intensity in 0.0..=1.0
    pub intensity: f32,
    pub humanize: bool,
    /// Chord onset humanization window, in milliseconds
    pub timing_variation_ms: u32,
    /// Percentage (0..=100) of generator steps that rest
    pub rest_probability: u8,
    pub intervals: IntervalWeights,
    pub durations: DurationWeights,
    pub range: NoteRange,
    pub root: PitchClass,
    pub mode: Mode,
}

impl Default for PerformanceParams {
    fn default() -> Self {
        Self {
            tempo: Tempo::default(),
            intensity: 0.8,
            humanize: false,
            timing_variation_ms: 15,
            rest_probability: 0,
            intervals: IntervalWeights::default(),
            durations: DurationWeights::default(),
            range: NoteRange::default(),
            root: PitchClass::C,
            mode: Mode::Ionian,
        }
    }
}

impl PerformanceParams {
    /// Pitches the generators may use right now
    pub fn allowed_pitches(&self) -> Vec<Pitch> {
        scale_notes(self.root, self.mode, self.range)
    }

    pub fn walk_params(&self) -> WalkParams<'_> {
        WalkParams {
            intensity: self.intensity,
            rest_probability: self.rest_probability,
            intervals: &self.intervals,
        }
    }

    pub fn chord_params(&self) -> ChordParams {
        ChordParams {
            intensity: self.intensity,
            rest_probability: self.rest_probability,
            humanize: self.humanize,
            timing_variation_ms: self.timing_variation_ms,
        }
    }

    /// Clamp values coming from a config file into their valid ranges
    pub fn sanitized(mut self) -> Self {
        if self.intensity.is_nan() {
            self.intensity = Self::default().intensity;
        }
        self.intensity = self.intensity.clamp(0.0, 1.0);
        self.rest_probability = self.rest_probability.min(100);
        self
    }
}
