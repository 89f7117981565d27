// Pattern - Recorded event sequences held in lettered slots
// A slot is like a "clip": events in recording order plus the tempo the
// recording was made at.

use crate::sequencer::event::RecordedEvent;
use crate::sequencer::timeline::Tempo;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a pattern slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SlotId {
    #[default]
    A,
    B,
    C,
    D,
}

impl SlotId {
    pub const ALL: [SlotId; 4] = [SlotId::A, SlotId::B, SlotId::C, SlotId::D];

    fn index(self) -> usize {
        match self {
            SlotId::A => 0,
            SlotId::B => 1,
            SlotId::C => 2,
            SlotId::D => 3,
        }
    }

    pub fn letter(self) -> char {
        match self {
            SlotId::A => 'A',
            SlotId::B => 'B',
            SlotId::C => 'C',
            SlotId::D => 'D',
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for SlotId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(SlotId::A),
            "B" => Ok(SlotId::B),
            "C" => Ok(SlotId::C),
            "D" => Ok(SlotId::D),
            other => Err(format!("Unknown pattern slot: {}", other)),
        }
    }
}

/// Events recorded into one slot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternSlot {
    events: Vec<RecordedEvent>,
    /// Tempo at the start of the recording (0 = never recorded)
    record_bpm: u32,
}

impl PatternSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn record_bpm(&self) -> u32 {
        self.record_bpm
    }

    /// Time of the last event, in seconds since the recording started
    pub fn duration_seconds(&self) -> f64 {
        self.events.last().map(|event| event.time).unwrap_or(0.0)
    }

    /// Empty the slot and remember the tempo of the recording about to start
    pub fn reset(&mut self, tempo: Tempo) {
        self.events.clear();
        self.record_bpm = tempo.bpm();
    }

    /// Append an event. Recording is monotonic in time, so appending keeps
    /// the slot in chronological order.
    pub fn push(&mut self, event: RecordedEvent) {
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// The four pattern slots
#[derive(Debug, Clone, Default)]
pub struct PatternBank {
    slots: [PatternSlot; 4],
}

impl PatternBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, id: SlotId) -> &PatternSlot {
        &self.slots[id.index()]
    }

    pub fn slot_mut(&mut self, id: SlotId) -> &mut PatternSlot {
        &mut self.slots[id.index()]
    }

    /// Short description used by the status line
    pub fn describe(&self, id: SlotId) -> String {
        let slot = self.slot(id);
        if slot.is_empty() {
            format!("Active Pattern: {} | No events recorded.", id)
        } else {
            format!(
                "Active Pattern: {} | {} events ({:.2}s @ {} BPM).",
                id,
                slot.len(),
                slot.duration_seconds(),
                slot.record_bpm()
            )
        }
    }
}
