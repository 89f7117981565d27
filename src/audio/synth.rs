// Synth - Banque de voix sinus pour le rendu des notes
// Chaque note démarre à une frame absolue et sonne pendant une durée fixe
// (attaque courte puis décroissance linéaire). Le mix est saturé par tanh.

use crate::audio::player::{AudioError, NotePlayer, PlayParams};
use crate::theory::Pitch;
use std::f32::consts::TAU;
use std::sync::{Arc, Mutex, TryLockError};
use tracing::debug;

const MAX_VOICES: usize = 32;

/// Attack length in seconds
const ATTACK_SECONDS: f32 = 0.01;

/// Headroom applied to the voice sum before clipping
const MIX_GAIN: f32 = 0.35;

#[derive(Debug, Clone, Copy, Default)]
struct Voice {
    phase: f32,
    phase_increment: f32,
    gain: f32,
    /// First frame of the note
    start: u64,
    /// Length in frames
    length: u64,
    attack: u64,
    /// Trigger order, used for voice stealing (higher = newer)
    age: u64,
    active: bool,
}

impl Voice {
    fn envelope(&self, frame: u64) -> f32 {
        let elapsed = frame - self.start;
        if elapsed < self.attack {
            elapsed as f32 / self.attack as f32
        } else {
            let decay = (self.length - self.attack).max(1);
            1.0 - (elapsed - self.attack) as f32 / decay as f32
        }
    }

    fn next_sample(&mut self, frame: u64) -> f32 {
        if !self.active || frame < self.start {
            return 0.0;
        }
        if frame >= self.start + self.length {
            self.active = false;
            return 0.0;
        }

        let sample = (self.phase * TAU).sin() * self.gain * self.envelope(frame);
        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        sample
    }

    /// Frames left before the voice falls silent
    fn remaining(&self, frame: u64) -> u64 {
        (self.start + self.length).saturating_sub(frame)
    }
}

/// Polyphonic sine voices sharing one frame counter
#[derive(Debug)]
pub struct VoiceBank {
    voices: [Voice; MAX_VOICES],
    sample_rate: f32,
    /// Next frame to be rendered
    frame: u64,
    age_counter: u64,
}

impl VoiceBank {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            voices: [Voice::default(); MAX_VOICES],
            sample_rate: sample_rate as f32,
            frame: 0,
            age_counter: 0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate as u32
    }

    /// Next frame to be rendered
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }

    /// Start a note at `start_seconds` (clamped to the next rendered frame)
    pub fn trigger(
        &mut self,
        frequency: f32,
        start_seconds: f64,
        duration_seconds: f64,
        gain: f32,
    ) {
        let start = ((start_seconds.max(0.0) * self.sample_rate as f64) as u64).max(self.frame);
        let length = ((duration_seconds.max(0.0) * self.sample_rate as f64) as u64).max(1);
        let attack = ((ATTACK_SECONDS * self.sample_rate) as u64).min(length);

        self.age_counter = self.age_counter.wrapping_add(1);
        let index = self.free_voice();
        self.voices[index] = Voice {
            phase: 0.0,
            phase_increment: frequency / self.sample_rate,
            gain: gain.clamp(0.0, 1.0),
            start,
            length,
            attack,
            age: self.age_counter,
            active: true,
        };
    }

    /// An idle voice, or the one closest to its end (oldest on ties)
    fn free_voice(&self) -> usize {
        if let Some(index) = self.voices.iter().position(|v| !v.active) {
            return index;
        }
        let frame = self.frame;
        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| (v.remaining(frame), v.age))
            .map(|(index, _)| index)
            .unwrap_or(0)
    }

    /// Render one block. `right` receives the same mono mix as `left`.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let frame = self.frame;
            let mix: f32 = self.voices.iter_mut().map(|v| v.next_sample(frame)).sum();
            let sample = (mix * MIX_GAIN).tanh();
            *l = sample;
            *r = sample;
            self.frame += 1;
        }
    }
}

/// `NotePlayer` handle over a shared voice bank.
///
/// Cloning the handle shares the bank, so the output callback and the session
/// can both hold one.
#[derive(Debug, Clone)]
pub struct SynthPlayer {
    bank: Arc<Mutex<VoiceBank>>,
    ready: bool,
}

impl SynthPlayer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            bank: Arc::new(Mutex::new(VoiceBank::new(sample_rate))),
            ready: false,
        }
    }

    pub fn bank(&self) -> Arc<Mutex<VoiceBank>> {
        Arc::clone(&self.bank)
    }

    /// Render one block from the shared bank without waiting for it.
    ///
    /// Returns `Ok(false)` and writes silence when the session holds the bank;
    /// the bank's frame counter does not move in that case.
    pub fn render(&self, left: &mut [f32], right: &mut [f32]) -> Result<bool, AudioError> {
        match self.bank.try_lock() {
            Ok(mut bank) => {
                bank.render(left, right);
                Ok(true)
            }
            Err(TryLockError::WouldBlock) => {
                left.fill(0.0);
                right.fill(0.0);
                Ok(false)
            }
            Err(TryLockError::Poisoned(_)) => {
                left.fill(0.0);
                right.fill(0.0);
                Err(AudioError::Poisoned)
            }
        }
    }
}

impl NotePlayer for SynthPlayer {
    fn prepare(&mut self) -> Result<(), AudioError> {
        let bank = self.bank.lock().map_err(|_| AudioError::Poisoned)?;
        if bank.sample_rate() == 0 {
            return Err(AudioError::Load("sample rate must be positive".to_string()));
        }
        debug!(sample_rate = bank.sample_rate(), "Sine voice bank ready");
        self.ready = true;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn play(&mut self, pitch: Pitch, when: f64, params: PlayParams) -> Result<(), AudioError> {
        if !self.ready {
            return Err(AudioError::NotReady);
        }
        let mut bank = self.bank.lock().map_err(|_| AudioError::Poisoned)?;
        bank.trigger(pitch.frequency(), when, params.duration_seconds, params.gain);
        Ok(())
    }
}
