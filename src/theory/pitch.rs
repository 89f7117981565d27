// Pitch - Named notes of the keyboard
// A pitch is an index into the fixed chromatic sequence C3, C#3, ..., B5, C6

use super::TheoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Replace typographic accidentals with their ASCII spelling
fn normalize_accidentals(name: &str) -> String {
    name.replace('♯', "#").replace('♭', "b")
}

/// Semitone offset of a spelled note name relative to C of the same octave.
/// "Cb" yields -1 and "B#" yields 12 so that octave arithmetic stays correct.
fn spelling_offset(name: &str) -> Option<i32> {
    let mut chars = name.chars();
    let base = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let accidental = match chars.as_str() {
        "" => 0,
        "#" => 1,
        "b" => -1,
        _ => return None,
    };
    Some(base + accidental)
}

/// One of the twelve pitch classes (C = 0 ... B = 11)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);

    /// Create from a semitone number (wrapped to 0..12)
    pub fn new(semitone: u8) -> Self {
        Self(semitone % 12)
    }

    pub fn semitone(self) -> u8 {
        self.0
    }

    /// Sharp spelling of this pitch class
    pub fn name(self) -> &'static str {
        PITCH_CLASS_NAMES[self.0 as usize]
    }

    /// Strict parse of a note name such as "C", "F#", "Eb" or "G♯"
    pub fn parse_name(name: &str) -> Option<Self> {
        let normalized = normalize_accidentals(name.trim());
        spelling_offset(&normalized).map(|offset| Self(offset.rem_euclid(12) as u8))
    }

    /// Lenient parse used for the key selector.
    ///
    /// Accepts typographic accidentals, keeps only the first member of an
    /// enharmonic pair written with a slash ("C#/Db" -> C#) and falls back to C
    /// when the label is not a note name.
    pub fn from_root_label(label: &str) -> Self {
        // Flat spellings resolve too ("Bb" -> A#); none of them fall back to C
        let normalized = normalize_accidentals(label);
        let first = normalized.split('/').next().unwrap_or("").trim();
        Self::parse_name(first).unwrap_or(Self::C)
    }

    /// Semitone distance from `root` going upward, in 0..12
    pub fn relative_to(self, root: PitchClass) -> u8 {
        (self.0 + 12 - root.0) % 12
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for PitchClass {
    type Error = TheoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_name(&value).ok_or(TheoryError::UnknownPitch(value))
    }
}

impl From<PitchClass> for String {
    fn from(value: PitchClass) -> Self {
        value.name().to_string()
    }
}

/// A note of the keyboard, ordered by its position in the chromatic sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pitch(u8);

impl Pitch {
    /// Octave number of the first pitch of the sequence
    pub const LOWEST_OCTAVE: i32 = 3;

    /// Number of pitches in the sequence (C3..=C6)
    pub const COUNT: usize = 37;

    pub const LOWEST: Pitch = Pitch(0);
    pub const HIGHEST: Pitch = Pitch(Self::COUNT as u8 - 1);

    /// MIDI note number of C3 (C4 = 60)
    const MIDI_OFFSET: u8 = 48;

    pub fn from_index(index: usize) -> Option<Self> {
        (index < Self::COUNT).then_some(Self(index as u8))
    }

    /// Position in the chromatic sequence
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn pitch_class(self) -> PitchClass {
        PitchClass::new(self.0)
    }

    pub fn octave(self) -> i32 {
        Self::LOWEST_OCTAVE + (self.0 / 12) as i32
    }

    pub fn midi_note(self) -> u8 {
        Self::MIDI_OFFSET + self.0
    }

    /// Equal temperament frequency in Hz (A4 = 440 Hz)
    pub fn frequency(self) -> f32 {
        440.0 * 2_f32.powf((self.midi_note() as f32 - 69.0) / 12.0)
    }

    /// Every pitch of the keyboard, lowest first
    pub fn all() -> impl Iterator<Item = Pitch> {
        (0..Self::COUNT as u8).map(Pitch)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class().name(), self.octave())
    }
}

impl FromStr for Pitch {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = normalize_accidentals(s.trim());
        let split = trimmed
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .ok_or_else(|| TheoryError::UnknownPitch(s.to_string()))?;
        let (name, octave) = trimmed.split_at(split);

        let offset =
            spelling_offset(name).ok_or_else(|| TheoryError::UnknownPitch(s.to_string()))?;
        let octave: i32 = octave
            .parse()
            .map_err(|_| TheoryError::UnknownPitch(s.to_string()))?;

        let index = (octave - Self::LOWEST_OCTAVE) * 12 + offset;
        if (0..Self::COUNT as i32).contains(&index) {
            Ok(Self(index as u8))
        } else {
            Err(TheoryError::OutOfRange(s.to_string()))
        }
    }
}

impl TryFrom<String> for Pitch {
    type Error = TheoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pitch> for String {
    fn from(value: Pitch) -> Self {
        value.to_string()
    }
}
