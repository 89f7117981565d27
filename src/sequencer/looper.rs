// Loop Scheduler - Self-rescheduling generator loop
// Each tick draws a note value, runs the generator, then arms a one-shot timer
// for the next tick. Tempo and weights are re-read on every tick.

use crate::generator::{DurationWeights, GeneratorKind};
use crate::scheduler::{TimerHandle, TimerQueue};
use crate::sequencer::timeline::Tempo;
use rand::Rng;

/// Loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Stopped,
    Running {
        kind: GeneratorKind,
        /// Timer of the next tick, if one is armed
        pending: Option<TimerHandle>,
    },
}

/// Period of the next tick: one drawn note value at `tempo`, in milliseconds
pub fn step_period_ms<R: Rng + ?Sized>(
    tempo: Tempo,
    durations: &DurationWeights,
    rng: &mut R,
) -> f64 {
    tempo.beats_to_ms(durations.choose_beats(rng))
}

#[derive(Debug, Default)]
pub struct LoopScheduler {
    state: LoopState,
}

impl LoopScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. })
    }

    /// Generator driven by the running loop
    pub fn kind(&self) -> Option<GeneratorKind> {
        match self.state {
            LoopState::Running { kind, .. } => Some(kind),
            LoopState::Stopped => None,
        }
    }

    /// Enter the running state. Returns false if a loop is already running.
    pub fn begin(&mut self, kind: GeneratorKind) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = LoopState::Running {
            kind,
            pending: None,
        };
        true
    }

    /// Remember the timer of the next tick. Ignored when stopped.
    pub fn arm(&mut self, handle: TimerHandle) {
        if let LoopState::Running { pending, .. } = &mut self.state {
            *pending = Some(handle);
        }
    }

    /// Called when the tick timer fires; the handle is no longer pending
    pub fn fired(&mut self) {
        if let LoopState::Running { pending, .. } = &mut self.state {
            *pending = None;
        }
    }

    /// Stop the loop and cancel its pending tick. Returns the kind that was running.
    pub fn stop<T>(&mut self, timers: &mut TimerQueue<T>) -> Option<GeneratorKind> {
        match std::mem::take(&mut self.state) {
            LoopState::Running { kind, pending } => {
                if let Some(handle) = pending {
                    timers.cancel(handle);
                }
                Some(kind)
            }
            LoopState::Stopped => None,
        }
    }
}
