// Sequencer module - Events, pattern slots and the transport
// Recording, replay and the generator loop all run on the session's timer queue

pub mod event;
pub mod looper;
pub mod pattern;
pub mod player;
pub mod recorder;
pub mod timeline;
pub mod transport;

pub use event::{Event, NOTE_DURATION_SECONDS, RecordedEvent};
pub use looper::{LoopScheduler, LoopState, step_period_ms};
pub use pattern::{PatternBank, PatternSlot, SlotId};
pub use player::{COMPLETION_GRACE_MS, PatternPlayer, PlaybackPlan, PlaybackTask, playback_delays};
pub use recorder::{PatternRecorder, RecordingSession, RecordingSummary};
pub use timeline::Tempo;
pub use transport::TransportState;
