// Generator module - Probabilistic note and chord generation
// Generators read the allowed pitches fresh on every call and report whether
// they played, rested, or had nothing to play.

pub mod chord;
pub mod walker;
pub mod weights;

pub use chord::{ChordNote, ChordParams, ChordVoicing, generate_chord};
pub use walker::{NoteWalker, WalkParams};
pub use weights::{
    DurationWeights, IntervalSlider, IntervalWeights, NoteValue, WeightTable, should_rest,
    weighted_choice,
};

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which generator a loop drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    #[default]
    Note,
    Chord,
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorKind::Note => f.write_str("note"),
            GeneratorKind::Chord => f.write_str("chord"),
        }
    }
}

/// Result of one generator invocation
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome<T> {
    /// The allowed-pitch sequence was too small to play anything
    Unplayable,
    /// The rest draw succeeded: intentional silence
    Rest,
    Played(T),
}

impl<T> StepOutcome<T> {
    pub fn is_played(&self) -> bool {
        matches!(self, StepOutcome::Played(_))
    }

    pub fn played(self) -> Option<T> {
        match self {
            StepOutcome::Played(value) => Some(value),
            _ => None,
        }
    }
}

/// Gain drawn uniformly from `[0.5 * intensity, intensity]`
pub fn varied_intensity<R: Rng + ?Sized>(rng: &mut R, intensity: f32) -> f32 {
    // Also catches NaN
    if !(intensity > 0.0) {
        return 0.0;
    }
    let intensity = intensity.min(1.0);
    rng.gen_range(0.5 * intensity..=intensity)
}
