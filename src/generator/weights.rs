// Weights - Weighted random selection
// Shared by interval choice, duration choice and the rest decision

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Outcome -> weight table with a stable iteration order
///
/// The fallback key is returned whenever the total weight is zero, so a table
/// whose sliders are all pulled down never divides by zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightTable<K> {
    entries: Vec<(K, u32)>,
    fallback: K,
}

impl<K: Copy + PartialEq> WeightTable<K> {
    pub fn new(entries: Vec<(K, u32)>, fallback: K) -> Self {
        Self { entries, fallback }
    }

    pub fn entries(&self) -> &[(K, u32)] {
        &self.entries
    }

    pub fn fallback(&self) -> K {
        self.fallback
    }

    pub fn weight(&self, key: K) -> Option<u32> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, weight)| *weight)
    }

    /// Update the weight of an existing key. Returns false for unknown keys.
    pub fn set_weight(&mut self, key: K, weight: u32) -> bool {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => {
                entry.1 = weight;
                true
            }
            None => false,
        }
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, weight)| *weight as u64).sum()
    }

    /// Draw a key with probability proportional to its weight
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> K {
        weighted_choice(self, rng)
    }
}

/// Cumulative-sum weighted draw over `table` in its stable order.
///
/// Draws `r` uniformly in `[0, total)` and returns the first key whose running
/// sum exceeds `r`; a zero total returns the table's fallback key.
pub fn weighted_choice<K, R>(table: &WeightTable<K>, rng: &mut R) -> K
where
    K: Copy + PartialEq,
    R: Rng + ?Sized,
{
    let total = table.total();
    if total == 0 {
        return table.fallback;
    }

    let draw = rng.gen_range(0..total);
    let mut cumulative = 0u64;
    for &(key, weight) in &table.entries {
        cumulative += weight as u64;
        if draw < cumulative {
            return key;
        }
    }
    table.fallback
}

/// Bernoulli rest decision: true when `uniform[0, 100) < rest_probability`
pub fn should_rest<R: Rng + ?Sized>(rng: &mut R, rest_probability: u8) -> bool {
    rng.gen_range(0.0..100.0) < rest_probability as f64
}

/// Interval sliders exposed to the user.
/// Each slider drives one or two semitone-distance buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalSlider {
    Unison,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
}

impl IntervalSlider {
    pub const ALL: [IntervalSlider; 6] = [
        IntervalSlider::Unison,
        IntervalSlider::Second,
        IntervalSlider::Third,
        IntervalSlider::Fourth,
        IntervalSlider::Fifth,
        IntervalSlider::Sixth,
    ];

    /// Semitone distance the slider is labelled with
    pub fn distance(self) -> u8 {
        match self {
            IntervalSlider::Unison => 0,
            IntervalSlider::Second => 2,
            IntervalSlider::Third => 3,
            IntervalSlider::Fourth => 5,
            IntervalSlider::Fifth => 7,
            IntervalSlider::Sixth => 9,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IntervalSlider::Unison => "unison",
            IntervalSlider::Second => "2nd",
            IntervalSlider::Third => "3rd",
            IntervalSlider::Fourth => "4th",
            IntervalSlider::Fifth => "5th",
            IntervalSlider::Sixth => "6th",
        }
    }

    /// Accepts labels ("2nd", "second") or the slider's semitone distance ("2")
    pub fn from_name(name: &str) -> Option<Self> {
        let key = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|slider| {
            let long = format!("{:?}", slider).to_ascii_lowercase();
            key == slider.label() || key == long || key == slider.distance().to_string()
        })
    }
}

impl fmt::Display for IntervalSlider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Semitone-distance buckets drawn by the note walker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<u8, u32>", into = "BTreeMap<u8, u32>")]
pub struct IntervalWeights(WeightTable<u8>);

impl IntervalWeights {
    /// Bucket keys in draw order
    pub const DISTANCES: [u8; 9] = [0, 1, 2, 3, 4, 5, 7, 9, 12];

    /// Returned when every bucket weight is zero (a whole step)
    pub const FALLBACK_DISTANCE: u8 = 2;

    pub fn table(&self) -> &WeightTable<u8> {
        &self.0
    }

    pub fn weight(&self, distance: u8) -> Option<u32> {
        self.0.weight(distance)
    }

    /// Set one bucket directly. Unknown distances are ignored.
    pub fn set_distance(&mut self, distance: u8, weight: u32) -> bool {
        self.0.set_weight(distance, weight)
    }

    /// Apply a slider value with its coupling rules.
    ///
    /// The 2nd slider drives distances 1 and 2 together. The 6th slider drives
    /// distance 9 and sets the octave (12) to `max(1, round(value / 2))`.
    pub fn set_slider(&mut self, slider: IntervalSlider, value: u32) {
        match slider {
            IntervalSlider::Second => {
                self.0.set_weight(1, value);
                self.0.set_weight(2, value);
            }
            IntervalSlider::Sixth => {
                self.0.set_weight(9, value);
                self.0.set_weight(12, value.div_ceil(2).max(1));
            }
            other => {
                self.0.set_weight(other.distance(), value);
            }
        }
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> u8 {
        self.0.choose(rng)
    }
}

impl Default for IntervalWeights {
    fn default() -> Self {
        Self(WeightTable::new(
            vec![
                (0, 15),
                (1, 0),
                (2, 30),
                (3, 20),
                (4, 0),
                (5, 10),
                (7, 8),
                (9, 4),
                (12, 2),
            ],
            Self::FALLBACK_DISTANCE,
        ))
    }
}

impl From<BTreeMap<u8, u32>> for IntervalWeights {
    fn from(map: BTreeMap<u8, u32>) -> Self {
        let mut weights = Self::default();
        for (distance, weight) in map {
            weights.set_distance(distance, weight);
        }
        weights
    }
}

impl From<IntervalWeights> for BTreeMap<u8, u32> {
    fn from(weights: IntervalWeights) -> Self {
        weights.0.entries.into_iter().collect()
    }
}

/// Note values the loop scheduler can wait between steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteValue {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    DottedQuarter,
}

impl NoteValue {
    pub const ALL: [NoteValue; 6] = [
        NoteValue::Whole,
        NoteValue::Half,
        NoteValue::Quarter,
        NoteValue::Eighth,
        NoteValue::Sixteenth,
        NoteValue::DottedQuarter,
    ];

    /// Length in beats (quarter note = 1 beat)
    pub fn beats(self) -> f64 {
        match self {
            NoteValue::Whole => 4.0,
            NoteValue::Half => 2.0,
            NoteValue::Quarter => 1.0,
            NoteValue::Eighth => 0.5,
            NoteValue::Sixteenth => 0.25,
            NoteValue::DottedQuarter => 1.5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NoteValue::Whole => "whole",
            NoteValue::Half => "half",
            NoteValue::Quarter => "quarter",
            NoteValue::Eighth => "eighth",
            NoteValue::Sixteenth => "sixteenth",
            NoteValue::DottedQuarter => "dotted-quarter",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let key = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|value| value.name() == key)
    }
}

impl fmt::Display for NoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Weights of the note values drawn for each loop step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<NoteValue, u32>", into = "BTreeMap<NoteValue, u32>")]
pub struct DurationWeights(WeightTable<NoteValue>);

impl DurationWeights {
    /// Returned when every duration weight is zero
    pub const FALLBACK: NoteValue = NoteValue::Quarter;

    pub fn table(&self) -> &WeightTable<NoteValue> {
        &self.0
    }

    pub fn weight(&self, value: NoteValue) -> Option<u32> {
        self.0.weight(value)
    }

    pub fn set(&mut self, value: NoteValue, weight: u32) {
        self.0.set_weight(value, weight);
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> NoteValue {
        self.0.choose(rng)
    }

    /// Draw a note value and return its length in beats
    pub fn choose_beats<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.choose(rng).beats()
    }
}

impl Default for DurationWeights {
    fn default() -> Self {
        Self(WeightTable::new(
            vec![
                (NoteValue::Whole, 10),
                (NoteValue::Half, 15),
                (NoteValue::Quarter, 40),
                (NoteValue::Eighth, 20),
                (NoteValue::Sixteenth, 10),
                (NoteValue::DottedQuarter, 5),
            ],
            Self::FALLBACK,
        ))
    }
}

impl From<BTreeMap<NoteValue, u32>> for DurationWeights {
    fn from(map: BTreeMap<NoteValue, u32>) -> Self {
        let mut weights = Self::default();
        for (value, weight) in map {
            weights.set(value, weight);
        }
        weights
    }
}

impl From<DurationWeights> for BTreeMap<NoteValue, u32> {
    fn from(weights: DurationWeights) -> Self {
        weights.0.entries.into_iter().collect()
    }
}
