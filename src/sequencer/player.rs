// Pattern Player - Replays a slot through the timer queue
// Every event is scheduled up front at `time * recordBpm / currentBpm`; a
// trailing completion timer reports the end of playback.

use crate::scheduler::{TimerHandle, TimerQueue};
use crate::sequencer::event::Event;
use crate::sequencer::pattern::{PatternSlot, SlotId};
use crate::sequencer::timeline::Tempo;

/// Delay between the last event and the completion timer
pub const COMPLETION_GRACE_MS: f64 = 120.0;

/// Timer payloads produced by pattern playback
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackTask {
    /// Replay one recorded event
    Event(Event),
    /// Playback of the slot finished
    Done(SlotId),
}

/// Outcome of starting a playback
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackPlan {
    pub slot: SlotId,
    /// `recordBpm / currentBpm`
    pub scale: f64,
    /// Delay of each event from playback start, in milliseconds
    pub delays_ms: Vec<f64>,
    /// Delay of the completion timer, in milliseconds
    pub completion_ms: f64,
}

/// Compute the playback delays of `slot` at `tempo`, in milliseconds
pub fn playback_delays(slot: &PatternSlot, tempo: Tempo) -> Vec<f64> {
    let scale = tempo.playback_scale(slot.record_bpm());
    slot.events()
        .iter()
        .map(|event| event.time * scale * 1000.0)
        .collect()
}

/// Pattern player state: the timers of the playback in flight
#[derive(Debug, Default)]
pub struct PatternPlayer {
    pending: Vec<TimerHandle>,
    playing: Option<SlotId>,
}

impl PatternPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot currently being replayed
    pub fn playing(&self) -> Option<SlotId> {
        self.playing
    }

    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    /// Handles of every timer this player scheduled and has not cancelled
    pub fn pending(&self) -> &[TimerHandle] {
        &self.pending
    }

    /// Schedule a full replay of `slot` starting at `now`.
    ///
    /// Any playback already in flight is cancelled first. An empty slot
    /// schedules nothing and returns `None`.
    pub fn start<T: From<PlaybackTask>>(
        &mut self,
        id: SlotId,
        slot: &PatternSlot,
        tempo: Tempo,
        now: f64,
        timers: &mut TimerQueue<T>,
    ) -> Option<PlaybackPlan> {
        if slot.is_empty() {
            return None;
        }
        self.cancel(timers);

        let scale = tempo.playback_scale(slot.record_bpm());
        let delays_ms = playback_delays(slot, tempo);

        for (event, delay) in slot.events().iter().zip(&delays_ms) {
            let handle = timers.schedule_once(
                now,
                *delay,
                PlaybackTask::Event(event.event.clone()).into(),
            );
            self.pending.push(handle);
        }

        let completion_ms = delays_ms.last().copied().unwrap_or(0.0) + COMPLETION_GRACE_MS;
        let handle = timers.schedule_once(now, completion_ms, PlaybackTask::Done(id).into());
        self.pending.push(handle);
        self.playing = Some(id);

        Some(PlaybackPlan {
            slot: id,
            scale,
            delays_ms,
            completion_ms,
        })
    }

    /// Cancel every pending playback timer. Returns how many were still pending.
    pub fn cancel<T>(&mut self, timers: &mut TimerQueue<T>) -> usize {
        let cancelled = self
            .pending
            .drain(..)
            .filter(|handle| timers.cancel(*handle))
            .count();
        self.playing = None;
        cancelled
    }

    /// Called when the completion timer fires
    pub fn finish(&mut self) {
        self.pending.clear();
        self.playing = None;
    }
}
