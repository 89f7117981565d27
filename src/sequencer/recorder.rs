// Pattern Recorder - Timestamps performed events into the armed slot
// Times are seconds since the recording started, read from the session clock

use crate::sequencer::event::{Event, RecordedEvent};
use crate::sequencer::pattern::{PatternBank, SlotId};
use crate::sequencer::timeline::Tempo;

/// An active recording
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordingSession {
    pub slot: SlotId,
    /// Clock time (seconds) when the recording started
    pub started_at: f64,
    pub tempo: Tempo,
}

/// What a finished recording captured
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordingSummary {
    pub slot: SlotId,
    pub events: usize,
    pub duration_seconds: f64,
    pub tempo: Tempo,
}

/// Pattern recorder state
#[derive(Debug, Clone, Default)]
pub struct PatternRecorder {
    session: Option<RecordingSession>,
}

impl PatternRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }

    /// Arm `slot`: its previous content is replaced and `tempo` becomes the
    /// slot's recording tempo. Returns false (and changes nothing) if a
    /// recording is already running.
    pub fn start(&mut self, slot: SlotId, now: f64, tempo: Tempo, bank: &mut PatternBank) -> bool {
        if self.session.is_some() {
            return false;
        }
        bank.slot_mut(slot).reset(tempo);
        self.session = Some(RecordingSession {
            slot,
            started_at: now,
            tempo,
        });
        true
    }

    /// Append `event` stamped with `now - start`. No-op when not recording;
    /// returns the new event count otherwise.
    pub fn record(&mut self, event: Event, now: f64, bank: &mut PatternBank) -> Option<usize> {
        let session = self.session?;
        let slot = bank.slot_mut(session.slot);

        // Never stamp earlier than the previous event, even if the clock was
        // read before the recording started
        let floor = slot.duration_seconds();
        let time = (now - session.started_at).max(0.0).max(floor);

        slot.push(RecordedEvent::new(time, event));
        Some(slot.len())
    }

    /// Stop recording, keeping everything captured so far
    pub fn stop(&mut self, bank: &PatternBank) -> Option<RecordingSummary> {
        let session = self.session.take()?;
        let slot = bank.slot(session.slot);
        Some(RecordingSummary {
            slot: session.slot,
            events: slot.len(),
            duration_seconds: slot.duration_seconds(),
            tempo: session.tempo,
        })
    }
}
