// Event - What the performer plays and the recorder captures
// An event is either a single note or a chord; recorded events carry a time
// relative to the start of their recording.

use crate::theory::Pitch;
use std::fmt;

/// Nominal sounding length of a walked or pressed note, in seconds
pub const NOTE_DURATION_SECONDS: f64 = 1.2;

/// A playable musical event
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Note {
        pitch: Pitch,
        /// Gain in 0.0..=1.0
        velocity: f32,
        /// Sounding length in seconds
        duration: f64,
    },
    Chord {
        /// Chord members, lowest first
        pitches: Vec<Pitch>,
        velocity: f32,
    },
}

impl Event {
    /// Note event with the nominal duration
    pub fn note(pitch: Pitch, velocity: f32) -> Self {
        Event::Note {
            pitch,
            velocity,
            duration: NOTE_DURATION_SECONDS,
        }
    }

    pub fn velocity(&self) -> f32 {
        match self {
            Event::Note { velocity, .. } | Event::Chord { velocity, .. } => *velocity,
        }
    }

    /// Every pitch sounded by this event
    pub fn pitches(&self) -> Vec<Pitch> {
        match self {
            Event::Note { pitch, .. } => vec![*pitch],
            Event::Chord { pitches, .. } => pitches.clone(),
        }
    }

    pub fn is_chord(&self) -> bool {
        matches!(self, Event::Chord { .. })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Note { pitch, .. } => write!(f, "{}", pitch),
            Event::Chord { pitches, .. } => {
                let names: Vec<String> = pitches.iter().map(|p| p.to_string()).collect();
                write!(f, "{}", names.join(", "))
            }
        }
    }
}

/// An event captured during a recording
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// Seconds since the recording started
    pub time: f64,
    pub event: Event,
}

impl RecordedEvent {
    pub fn new(time: f64, event: Event) -> Self {
        Self { time, event }
    }
}
