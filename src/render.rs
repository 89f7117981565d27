// Offline render - Drives a session block by block on an audio frame clock
// Timers fire at block boundaries, the voice bank renders the block and the
// capture pipeline collects it, as the live output callback does.

use crate::audio::{
    AudioError, AudioTiming, CaptureAccumulator, CaptureControl, CaptureProcessor, SynthPlayer,
    capture_channel,
};
use crate::config::AudioConfig;
use crate::scheduler::Clock;
use crate::session::Session;
use tracing::debug;

/// Renders a session against a shared frame clock
pub struct OfflineRenderer {
    synth: SynthPlayer,
    timing: AudioTiming,
    processor: CaptureProcessor,
    accumulator: CaptureAccumulator,
    control: CaptureControl,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl OfflineRenderer {
    /// `synth` and `timing` must be the ones the session plays through and
    /// reads time from.
    pub fn new(synth: SynthPlayer, timing: AudioTiming, audio: &AudioConfig) -> Self {
        let (processor, accumulator, control) =
            capture_channel(audio.capture_capacity, timing.sample_rate());
        control.start();
        Self {
            synth,
            timing,
            processor,
            accumulator,
            control,
            left: vec![0.0; audio.block_size.max(1)],
            right: vec![0.0; audio.block_size.max(1)],
        }
    }

    pub fn now(&self) -> f64 {
        self.timing.now()
    }

    /// Frames captured so far
    pub fn captured_frames(&self) -> usize {
        self.accumulator.frames()
    }

    /// Render until the frame clock reaches `until` (seconds), firing due
    /// session timers before every block
    pub fn render_until(&mut self, session: &mut Session, until: f64) -> Result<(), AudioError> {
        while self.now() < until {
            session.run_pending();
            if !self.synth.render(&mut self.left, &mut self.right)? {
                continue;
            }
            self.processor
                .process(&[self.left.as_slice(), self.right.as_slice()]);
            self.timing.advance(self.left.len());
            self.accumulator.drain();
        }
        session.run_pending();
        Ok(())
    }

    /// Render for `seconds` more
    pub fn render_for(&mut self, session: &mut Session, seconds: f64) -> Result<(), AudioError> {
        let until = self.now() + seconds;
        self.render_until(session, until)
    }

    /// Render until no timer is pending, plus `tail` seconds for the last notes
    /// to ring out. Gives up after `limit` seconds.
    pub fn render_to_idle(
        &mut self,
        session: &mut Session,
        tail: f64,
        limit: f64,
    ) -> Result<(), AudioError> {
        let give_up = self.now() + limit;
        while let Some(deadline) = session.next_deadline() {
            if deadline > give_up {
                debug!(deadline, "Timers still pending past the render limit");
                break;
            }
            self.render_until(session, deadline.max(self.now()) + 1e-6)?;
        }
        self.render_for(session, tail)
    }

    /// Stop capturing and hand over the interleaved stereo take
    pub fn finish(mut self) -> (Vec<f32>, u32) {
        self.control.stop();
        let sample_rate = self.accumulator.sample_rate();
        (self.accumulator.finish(), sample_rate)
    }
}
