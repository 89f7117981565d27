// Note player - The instrument the session plays through
// Implementations must be ready (`prepare`) before any note is played.

use crate::theory::Pitch;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AudioError {
    #[error("Instrument is not loaded")]
    NotReady,

    #[error("Failed to load instrument: {0}")]
    Load(String),

    #[error("Voice bank is unavailable (lock poisoned)")]
    Poisoned,

    #[error("Audio device error: {0}")]
    Device(String),
}

/// Per-note playback parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayParams {
    /// Sounding length in seconds
    pub duration_seconds: f64,
    /// Linear gain in 0.0..=1.0
    pub gain: f32,
}

/// Something that can sound a pitch at a point in time
pub trait NotePlayer: Send {
    /// Load the instrument. A failure is terminal for the session.
    fn prepare(&mut self) -> Result<(), AudioError>;

    fn is_ready(&self) -> bool;

    /// Sound `pitch` at `when` (seconds on the session clock; a time in the
    /// past means "now").
    fn play(&mut self, pitch: Pitch, when: f64, params: PlayParams) -> Result<(), AudioError>;
}

impl<P: NotePlayer + ?Sized> NotePlayer for Box<P> {
    fn prepare(&mut self) -> Result<(), AudioError> {
        (**self).prepare()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn play(&mut self, pitch: Pitch, when: f64, params: PlayParams) -> Result<(), AudioError> {
        (**self).play(pitch, when, params)
    }
}
