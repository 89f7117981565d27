// Chord generator - Random in-scale triads
// Stacks every other allowed pitch on a random base (i, i+2, i+4), with an
// optional humanized onset per chord member.

use super::weights::should_rest;
use super::{StepOutcome, varied_intensity};
use crate::sequencer::event::Event;
use crate::theory::Pitch;
use rand::Rng;

/// Sounding length of the lowest chord member, in seconds
const CHORD_BASE_DURATION: f64 = 1.5;

/// Each higher chord member rings this much longer
const CHORD_DURATION_STEP: f64 = 0.1;

/// Minimum number of allowed pitches needed to build a chord
pub const MIN_CHORD_POOL: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct ChordParams {
    /// Dynamic intensity in 0.0..=1.0
    pub intensity: f32,
    /// Percentage (0..=100) of steps that rest
    pub rest_probability: u8,
    pub humanize: bool,
    /// Humanize window: onsets move by up to this many milliseconds either way
    pub timing_variation_ms: u32,
}

/// One sounding member of a chord
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordNote {
    pub pitch: Pitch,
    /// Onset relative to "now", in seconds (negative = slightly early)
    pub onset_offset: f64,
    pub duration: f64,
    pub gain: f32,
}

/// A generated chord ready to be played
#[derive(Debug, Clone, PartialEq)]
pub struct ChordVoicing {
    pub notes: Vec<ChordNote>,
    /// Velocity stored with the recorded chord event
    pub velocity: f32,
}

impl ChordVoicing {
    pub fn pitches(&self) -> Vec<Pitch> {
        self.notes.iter().map(|note| note.pitch).collect()
    }

    /// The event captured by the recorder for this chord
    pub fn to_event(&self) -> Event {
        Event::Chord {
            pitches: self.pitches(),
            velocity: self.velocity,
        }
    }
}

/// Build a random triad from `allowed`.
///
/// Fewer than three allowed pitches is a no-op; members past the end of the
/// sequence are dropped, so chords near the top may have two notes.
pub fn generate_chord<R: Rng + ?Sized>(
    allowed: &[Pitch],
    params: &ChordParams,
    rng: &mut R,
) -> StepOutcome<ChordVoicing> {
    if allowed.len() < MIN_CHORD_POOL {
        return StepOutcome::Unplayable;
    }
    if should_rest(rng, params.rest_probability) {
        return StepOutcome::Rest;
    }

    let base = rng.gen_range(0..allowed.len() - 2);
    let window = params.timing_variation_ms as f64 / 1000.0;

    let notes = [base, base + 2, base + 4]
        .into_iter()
        .filter_map(|index| allowed.get(index).copied())
        .enumerate()
        .map(|(member, pitch)| {
            let gain = varied_intensity(rng, params.intensity);
            let onset_offset = if params.humanize && window > 0.0 {
                rng.gen_range(-window..window)
            } else {
                0.0
            };
            ChordNote {
                pitch,
                onset_offset,
                duration: CHORD_BASE_DURATION + member as f64 * CHORD_DURATION_STEP,
                gain,
            }
        })
        .collect();

    StepOutcome::Played(ChordVoicing {
        notes,
        velocity: params.intensity,
    })
}
