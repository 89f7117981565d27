// Transport - Snapshot of what the session is doing
// Recording may run alongside a loop; a loop and a pattern playback never run
// together.

use crate::generator::GeneratorKind;
use crate::sequencer::pattern::SlotId;
use std::fmt;

/// Transport state as seen from outside the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransportState {
    /// Slot being recorded into
    pub recording: Option<SlotId>,
    /// Generator driven by the running loop
    pub looping: Option<GeneratorKind>,
    /// Slot being replayed
    pub playing_pattern: Option<SlotId>,
}

impl TransportState {
    pub fn is_idle(&self) -> bool {
        self.recording.is_none() && self.looping.is_none() && self.playing_pattern.is_none()
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn is_looping(&self) -> bool {
        self.looping.is_some()
    }

    pub fn is_playing_pattern(&self) -> bool {
        self.playing_pattern.is_some()
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_idle() {
            return f.write_str("idle");
        }
        let mut parts = Vec::new();
        if let Some(slot) = self.recording {
            parts.push(format!("recording {}", slot));
        }
        if let Some(kind) = self.looping {
            parts.push(format!("{} loop", kind));
        }
        if let Some(slot) = self.playing_pattern {
            parts.push(format!("playing {}", slot));
        }
        f.write_str(&parts.join(", "))
    }
}
