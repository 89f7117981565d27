// Scale - Modes and the allowed-note computation
// A scale is never stored: it is recomputed from (root, mode, range) each time

use super::pitch::{Pitch, PitchClass};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Modal interval sets available to the generators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Ionian,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Aeolian,
    Locrian,
    #[serde(alias = "pent_major")]
    PentatonicMajor,
    #[serde(alias = "pent_minor")]
    PentatonicMinor,
    Chromatic,
}

impl Mode {
    pub const ALL: [Mode; 10] = [
        Mode::Ionian,
        Mode::Dorian,
        Mode::Phrygian,
        Mode::Lydian,
        Mode::Mixolydian,
        Mode::Aeolian,
        Mode::Locrian,
        Mode::PentatonicMajor,
        Mode::PentatonicMinor,
        Mode::Chromatic,
    ];

    /// Semitone offsets from the root, ascending
    pub fn intervals(self) -> &'static [u8] {
        match self {
            Mode::Ionian => &[0, 2, 4, 5, 7, 9, 11],
            Mode::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Mode::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            Mode::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            Mode::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            Mode::Aeolian => &[0, 2, 3, 5, 7, 8, 10],
            Mode::Locrian => &[0, 1, 3, 5, 6, 8, 10],
            Mode::PentatonicMajor => &[0, 2, 4, 7, 9],
            Mode::PentatonicMinor => &[0, 3, 5, 7, 10],
            Mode::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Ionian => "ionian",
            Mode::Dorian => "dorian",
            Mode::Phrygian => "phrygian",
            Mode::Lydian => "lydian",
            Mode::Mixolydian => "mixolydian",
            Mode::Aeolian => "aeolian",
            Mode::Locrian => "locrian",
            Mode::PentatonicMajor => "pentatonic-major",
            Mode::PentatonicMinor => "pentatonic-minor",
            Mode::Chromatic => "chromatic",
        }
    }

    /// Look up a mode by name ("dorian", "pentatonic-major", "pent_minor", ...)
    pub fn from_name(name: &str) -> Option<Mode> {
        let key = name.trim().to_ascii_lowercase().replace('_', "-");
        let key = match key.as_str() {
            "pent-major" => "pentatonic-major".to_string(),
            "pent-minor" => "pentatonic-minor".to_string(),
            _ => key,
        };
        Self::ALL.into_iter().find(|mode| mode.name() == key)
    }

    /// Look up a mode by name, falling back to ionian for unknown names
    pub fn from_name_or_default(name: &str) -> Mode {
        Self::from_name(name).unwrap_or_default()
    }

    /// Whether a semitone offset from the root belongs to this mode
    pub fn contains(self, relative_semitone: u8) -> bool {
        self.intervals().contains(&relative_semitone)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inclusive playable range on the keyboard
///
/// The range may be inverted (low above high): it then contains nothing and
/// every derived scale is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRange {
    pub low: Pitch,
    pub high: Pitch,
}

impl NoteRange {
    pub fn new(low: Pitch, high: Pitch) -> Self {
        Self { low, high }
    }

    /// Whole keyboard (C3..C6)
    pub fn full() -> Self {
        Self::new(Pitch::LOWEST, Pitch::HIGHEST)
    }

    pub fn contains(&self, pitch: Pitch) -> bool {
        self.low <= pitch && pitch <= self.high
    }

    pub fn is_inverted(&self) -> bool {
        self.low > self.high
    }
}

impl Default for NoteRange {
    /// C4..C5
    fn default() -> Self {
        Self::new(
            Pitch::from_index(12).unwrap_or(Pitch::LOWEST),
            Pitch::from_index(24).unwrap_or(Pitch::HIGHEST),
        )
    }
}

impl fmt::Display for NoteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.low, self.high)
    }
}

/// Ordered pitches of the keyboard that belong to `mode` on `root` and lie
/// inside `range`. An empty result means "no playable note".
pub fn scale_notes(root: PitchClass, mode: Mode, range: NoteRange) -> Vec<Pitch> {
    Pitch::all()
        .filter(|pitch| mode.contains(pitch.pitch_class().relative_to(root)))
        .filter(|pitch| range.contains(*pitch))
        .collect()
}
