// Theory module - Pitches, pitch classes and modal scales
// The keyboard spans a fixed chromatic sequence (C3..C6); scales are derived
// from it on demand and never cached.

pub mod pitch;
pub mod scale;

pub use pitch::{Pitch, PitchClass};
pub use scale::{Mode, NoteRange, scale_notes};

/// Errors raised while reading pitch names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TheoryError {
    #[error("Unrecognized pitch name: {0}")]
    UnknownPitch(String),

    #[error("Pitch {0} is outside the keyboard range C3..C6")]
    OutOfRange(String),
}
