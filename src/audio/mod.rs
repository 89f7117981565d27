// Module audio - Instrument, rendu et capture WAV

pub mod capture;
pub mod engine;
pub mod export;
pub mod player;
pub mod synth;
pub mod timing;

pub use capture::{
    CaptureAccumulator, CaptureBlock, CaptureControl, CaptureProcessor, capture_channel,
};
pub use engine::{AudioEngine, OutputCallback, OutputDevice};
pub use export::{
    CaptureError, encode_wav, float_to_pcm16, recording_file_name, save_recording, write_wav_file,
};
pub use player::{AudioError, NotePlayer, PlayParams};
pub use synth::{SynthPlayer, VoiceBank};
pub use timing::AudioTiming;
