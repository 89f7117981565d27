// MyMusic Keyboard - Library exports for the binary, tests and benchmarks

pub mod audio;
pub mod config;
pub mod generator;
pub mod messaging;
pub mod render;
pub mod scheduler;
pub mod sequencer;
pub mod session;
pub mod theory;

// Re-export commonly used types for convenience
pub use audio::{AudioError, AudioTiming, CaptureError, NotePlayer, PlayParams, SynthPlayer};
pub use config::{AudioConfig, ConfigError, SessionConfig};
pub use generator::{GeneratorKind, IntervalSlider, NoteValue};
pub use messaging::{
    Command, CommandParseError, Notification, create_command_channel, create_notification_channel,
};
pub use render::OfflineRenderer;
pub use scheduler::{Clock, ManualClock, SystemClock};
pub use sequencer::{Event, SlotId, Tempo, TransportState};
pub use session::{PerformanceParams, Session, SessionBuilder};
pub use theory::{Mode, NoteRange, Pitch, PitchClass, TheoryError, scale_notes};
