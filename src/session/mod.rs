// Session - Owns every piece of performer state
// One logical thread drives the session: commands mutate it directly and
// `run_pending` fires the timers that came due on the session clock.

pub mod params;

pub use params::PerformanceParams;

use crate::audio::{NotePlayer, PlayParams};
use crate::generator::{
    ChordVoicing, GeneratorKind, IntervalSlider, NoteValue, NoteWalker, StepOutcome,
    generate_chord, varied_intensity,
};
use crate::messaging::{
    Command, Notification, NotificationCategory, NotificationLevel, NotificationProducer,
};
use crate::scheduler::{Clock, TimerQueue};
use crate::sequencer::{
    Event, LoopScheduler, NOTE_DURATION_SECONDS, PatternBank, PatternPlayer, PatternRecorder,
    PatternSlot, PlaybackTask, SlotId, Tempo, TransportState, step_period_ms,
};
use crate::theory::{Mode, NoteRange, Pitch, PitchClass};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ringbuf::traits::Producer;
use tracing::{debug, error, info, warn};

/// Velocity of a note played from the keyboard
pub const KEY_PRESS_VELOCITY: f32 = 0.8;

/// Work items held by the session timer queue
#[derive(Debug, Clone, PartialEq)]
pub enum SessionTask {
    LoopTick,
    Playback(PlaybackTask),
}

impl From<PlaybackTask> for SessionTask {
    fn from(task: PlaybackTask) -> Self {
        SessionTask::Playback(task)
    }
}

/// Configures and builds a [`Session`]
#[derive(Default)]
pub struct SessionBuilder {
    params: PerformanceParams,
    seed: Option<u64>,
    notifications: Option<NotificationProducer>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(mut self, params: PerformanceParams) -> Self {
        self.params = params.sanitized();
        self
    }

    /// Seed the random source (reproducible performances)
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn seed_opt(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Also publish status changes on a notification channel
    pub fn notifications(mut self, producer: NotificationProducer) -> Self {
        self.notifications = Some(producer);
        self
    }

    /// Prepare the instrument and assemble the session.
    ///
    /// An instrument that fails to prepare leaves the session usable but
    /// silent: the error becomes the status and every play operation is a
    /// no-op.
    pub fn build<P, C>(self, instrument: P, clock: C) -> Session
    where
        P: NotePlayer + 'static,
        C: Clock + 'static,
    {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut session = Session {
            params: self.params,
            bank: PatternBank::new(),
            active_slot: SlotId::default(),
            recorder: PatternRecorder::new(),
            pattern_player: PatternPlayer::new(),
            looper: LoopScheduler::new(),
            walker: NoteWalker::new(),
            timers: TimerQueue::new(),
            instrument: Box::new(instrument),
            instrument_ready: false,
            clock: Box::new(clock),
            rng,
            status: String::new(),
            notifications: self.notifications,
        };

        match session.instrument.prepare() {
            Ok(()) => {
                session.instrument_ready = true;
                session.notify(
                    NotificationLevel::Info,
                    NotificationCategory::Instrument,
                    "Instrument loaded.",
                );
            }
            Err(e) => {
                error!("Instrument failed to load: {}", e);
                session.notify(
                    NotificationLevel::Error,
                    NotificationCategory::Instrument,
                    format!("Error loading instrument: {}", e),
                );
            }
        }
        session
    }
}

/// The performer: scale settings, generators, pattern slots and transport
pub struct Session {
    params: PerformanceParams,
    bank: PatternBank,
    active_slot: SlotId,
    recorder: PatternRecorder,
    pattern_player: PatternPlayer,
    looper: LoopScheduler,
    walker: NoteWalker,
    timers: TimerQueue<SessionTask>,
    instrument: Box<dyn NotePlayer>,
    instrument_ready: bool,
    clock: Box<dyn Clock>,
    rng: StdRng,
    /// Latest status line
    status: String,
    notifications: Option<NotificationProducer>,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    // ===== Accessors =====

    pub fn params(&self) -> &PerformanceParams {
        &self.params
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn is_instrument_ready(&self) -> bool {
        self.instrument_ready && self.instrument.is_ready()
    }

    pub fn active_slot(&self) -> SlotId {
        self.active_slot
    }

    pub fn pattern(&self, slot: SlotId) -> &PatternSlot {
        self.bank.slot(slot)
    }

    pub fn active_pattern(&self) -> &PatternSlot {
        self.bank.slot(self.active_slot)
    }

    /// Position of the note walker in the allowed sequence
    pub fn walk_cursor(&self) -> Option<usize> {
        self.walker.last_index()
    }

    pub fn allowed_pitches(&self) -> Vec<Pitch> {
        self.params.allowed_pitches()
    }

    pub fn transport(&self) -> TransportState {
        TransportState {
            recording: self.recorder.session().map(|s| s.slot),
            looping: self.looper.kind(),
            playing_pattern: self.pattern_player.playing(),
        }
    }

    /// Timers that can still fire
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Session-clock time of the next timer, if any
    pub fn next_deadline(&mut self) -> Option<f64> {
        self.timers.next_deadline()
    }

    /// One-line summary of the whole session
    pub fn describe(&self) -> String {
        format!(
            "{} | {} {} | {} | {} | {}",
            self.params.tempo,
            self.params.root,
            self.params.mode,
            self.params.range,
            self.bank.describe(self.active_slot),
            self.transport()
        )
    }

    // ===== Runtime =====

    /// Fire every timer due at the current clock time, in (due, registration)
    /// order. Returns the number of tasks run.
    pub fn run_pending(&mut self) -> usize {
        let mut fired = 0;
        while let Some((_, task)) = self.timers.pop_due(self.clock.now()) {
            fired += 1;
            match task {
                SessionTask::LoopTick => {
                    self.looper.fired();
                    self.loop_tick();
                }
                SessionTask::Playback(PlaybackTask::Event(event)) => self.replay_event(event),
                SessionTask::Playback(PlaybackTask::Done(slot)) => {
                    self.pattern_player.finish();
                    info!(%slot, "Pattern playback finished");
                    self.notify(
                        NotificationLevel::Info,
                        NotificationCategory::Transport,
                        format!("Pattern {} playback done.", slot),
                    );
                }
            }
        }
        fired
    }

    /// Apply one user command. Capture and quit belong to the host and are
    /// ignored here.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SetTempo(bpm) => self.set_tempo(bpm),
            Command::SetIntensity(value) => self.set_intensity(value),
            Command::SetHumanize(on) => self.set_humanize(on),
            Command::SetTimingVariation(ms) => self.set_timing_variation(ms),
            Command::SetRestProbability(pct) => self.set_rest_probability(pct),
            Command::SetIntervalWeight(slider, weight) => self.set_interval_weight(slider, weight),
            Command::SetDurationWeight(value, weight) => self.set_duration_weight(value, weight),
            Command::SetLowNote(pitch) => self.set_low_note(pitch),
            Command::SetHighNote(pitch) => self.set_high_note(pitch),
            Command::SetRoot(label) => self.set_root(&label),
            Command::SetMode(mode) => self.set_mode(mode),
            Command::SelectSlot(slot) => self.select_slot(slot),
            Command::StartRecording => self.start_recording(),
            Command::StopRecording => self.stop_recording(),
            Command::PlayPattern => self.play_pattern(),
            Command::ClearPattern => self.clear_pattern(),
            Command::StartLoop(kind) => self.start_loop(kind),
            Command::StopLoop => self.stop_loop(),
            Command::PlayRandomNote => self.play_random_note(),
            Command::PlayChord => self.play_chord(),
            Command::PressKey(pitch) => self.press_key(pitch),
            Command::Status => {
                let summary = self.describe();
                self.notify(NotificationLevel::Info, NotificationCategory::Generic, summary);
            }
            Command::StartCapture | Command::StopCapture | Command::Quit => {
                debug!(?command, "Host command ignored by session");
            }
        }
    }

    // ===== Parameters =====

    /// Change the tempo. A running loop restarts immediately with the same
    /// generator (and a fresh walk cursor).
    pub fn set_tempo(&mut self, bpm: u32) {
        self.params.tempo = Tempo::new(bpm);
        debug!(tempo = %self.params.tempo, "Tempo changed");
        if let Some(kind) = self.looper.stop(&mut self.timers) {
            info!(%kind, tempo = %self.params.tempo, "Restarting loop at new tempo");
            self.start_loop(kind);
        }
    }

    /// NaN is ignored
    pub fn set_intensity(&mut self, intensity: f32) {
        if intensity.is_nan() {
            warn!("Intensity is not a number, ignored");
            return;
        }
        self.params.intensity = intensity.clamp(0.0, 1.0);
    }

    pub fn set_humanize(&mut self, on: bool) {
        self.params.humanize = on;
    }

    pub fn set_timing_variation(&mut self, ms: u32) {
        self.params.timing_variation_ms = ms;
    }

    pub fn set_rest_probability(&mut self, percent: u8) {
        self.params.rest_probability = percent.min(100);
    }

    pub fn set_interval_weight(&mut self, slider: IntervalSlider, weight: u32) {
        self.params.intervals.set_slider(slider, weight);
    }

    pub fn set_duration_weight(&mut self, value: NoteValue, weight: u32) {
        self.params.durations.set(value, weight);
    }

    pub fn set_note_range(&mut self, range: NoteRange) {
        self.params.range = range;
        if range.is_inverted() {
            warn!(%range, "Note range is inverted, nothing will play");
        }
    }

    pub fn set_low_note(&mut self, low: Pitch) {
        self.set_note_range(NoteRange::new(low, self.params.range.high));
    }

    pub fn set_high_note(&mut self, high: Pitch) {
        self.set_note_range(NoteRange::new(self.params.range.low, high));
    }

    /// Set the key from a selector label such as "C#/Db" (unknown labels give C)
    pub fn set_root(&mut self, label: &str) {
        self.params.root = PitchClass::from_root_label(label);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.params.mode = mode;
    }

    // ===== Pattern slots & recording =====

    /// Make `slot` active. Recording stops first and pattern playback is cancelled.
    pub fn select_slot(&mut self, slot: SlotId) {
        self.stop_recording();
        self.cancel_pattern_playback();
        self.active_slot = slot;
        let info = self.bank.describe(slot);
        self.notify(NotificationLevel::Info, NotificationCategory::Pattern, info);
    }

    /// Arm the active slot. A running loop keeps running and is recorded.
    pub fn start_recording(&mut self) {
        if self.recorder.is_recording() {
            return;
        }
        self.cancel_pattern_playback();
        let now = self.clock.now();
        if self
            .recorder
            .start(self.active_slot, now, self.params.tempo, &mut self.bank)
        {
            info!(slot = %self.active_slot, tempo = %self.params.tempo, "Recording started");
            self.notify(
                NotificationLevel::Info,
                NotificationCategory::Transport,
                format!("Recording Pattern {}...", self.active_slot),
            );
        }
    }

    /// Stop recording. The slot summary (event count, duration and tempo) is
    /// published before the final status.
    pub fn stop_recording(&mut self) {
        let Some(summary) = self.recorder.stop(&self.bank) else {
            return;
        };
        info!(
            slot = %summary.slot,
            events = summary.events,
            duration = summary.duration_seconds,
            "Recording stopped"
        );
        let info = self.bank.describe(summary.slot);
        self.notify(NotificationLevel::Info, NotificationCategory::Pattern, info);
        let message = if summary.events == 0 {
            "Recording stopped (empty)."
        } else {
            "Pattern recorded."
        };
        self.notify(NotificationLevel::Info, NotificationCategory::Pattern, message);
    }

    /// Replay the active slot, rescaled to the current tempo. Stops the loop.
    pub fn play_pattern(&mut self) {
        let slot = self.active_slot;
        if self.bank.slot(slot).is_empty() {
            self.notify(
                NotificationLevel::Info,
                NotificationCategory::Pattern,
                format!("Pattern {} is empty.", slot),
            );
            return;
        }

        if let Some(kind) = self.looper.stop(&mut self.timers) {
            debug!(%kind, "Loop stopped for pattern playback");
        }
        self.cancel_pattern_playback();

        let now = self.clock.now();
        let plan = self.pattern_player.start(
            slot,
            self.bank.slot(slot),
            self.params.tempo,
            now,
            &mut self.timers,
        );
        if let Some(plan) = plan {
            info!(
                %slot,
                events = plan.delays_ms.len(),
                scale = plan.scale,
                "Pattern playback started"
            );
            self.notify(
                NotificationLevel::Info,
                NotificationCategory::Transport,
                format!("Playing Pattern {}...", slot),
            );
        }
    }

    pub fn clear_pattern(&mut self) {
        let slot = self.active_slot;
        self.bank.slot_mut(slot).clear();
        self.cancel_pattern_playback();
        self.notify(
            NotificationLevel::Info,
            NotificationCategory::Pattern,
            format!("Cleared Pattern {}.", slot),
        );
    }

    fn cancel_pattern_playback(&mut self) {
        let cancelled = self.pattern_player.cancel(&mut self.timers);
        if cancelled > 0 {
            debug!(cancelled, "Pattern playback cancelled");
        }
    }

    // ===== Loop =====

    /// Start the generator loop. No-op while a loop runs or the instrument
    /// is not ready. The first step plays immediately.
    pub fn start_loop(&mut self, kind: GeneratorKind) {
        if !self.is_instrument_ready() {
            debug!(%kind, "Loop ignored, instrument not ready");
            return;
        }
        if !self.looper.begin(kind) {
            return;
        }
        self.cancel_pattern_playback();
        self.walker.reset();

        info!(%kind, tempo = %self.params.tempo, "Loop started");
        let message = match kind {
            GeneratorKind::Note => "Note loop running...",
            GeneratorKind::Chord => "Chord loop running...",
        };
        self.notify(NotificationLevel::Info, NotificationCategory::Transport, message);
        self.loop_tick();
    }

    pub fn stop_loop(&mut self) {
        if let Some(kind) = self.looper.stop(&mut self.timers) {
            info!(%kind, "Loop stopped");
            self.notify(
                NotificationLevel::Info,
                NotificationCategory::Transport,
                "Stopped loop playback.",
            );
        }
    }

    fn loop_tick(&mut self) {
        let Some(kind) = self.looper.kind() else {
            return;
        };
        let period_ms = step_period_ms(self.params.tempo, &self.params.durations, &mut self.rng);

        match kind {
            GeneratorKind::Note => self.walk_step(),
            GeneratorKind::Chord => self.chord_step(),
        }

        let handle = self
            .timers
            .schedule_once(self.clock.now(), period_ms, SessionTask::LoopTick);
        self.looper.arm(handle);
    }

    // ===== Single shots =====

    /// One note-walk step outside of a loop
    pub fn play_random_note(&mut self) {
        if self.is_instrument_ready() {
            self.walk_step();
        }
    }

    /// One random chord outside of a loop
    pub fn play_chord(&mut self) {
        if self.is_instrument_ready() {
            self.chord_step();
        }
    }

    /// Keyboard click
    pub fn press_key(&mut self, pitch: Pitch) {
        self.play_note(pitch, KEY_PRESS_VELOCITY);
    }

    // ===== Generators =====

    fn walk_step(&mut self) {
        let allowed = self.params.allowed_pitches();
        let params = self.params.walk_params();
        match self.walker.step(&allowed, &params, &mut self.rng) {
            StepOutcome::Unplayable => debug!("No allowed pitch, note step skipped"),
            StepOutcome::Rest => self.notify(
                NotificationLevel::Info,
                NotificationCategory::Generator,
                "Rest (no note played)",
            ),
            StepOutcome::Played(event) => {
                if let Event::Note {
                    pitch,
                    velocity,
                    duration,
                } = event
                {
                    let now = self.clock.now();
                    self.sound(
                        pitch,
                        now,
                        PlayParams {
                            duration_seconds: duration,
                            gain: velocity,
                        },
                    );
                    self.record(event, now);
                    self.notify(
                        NotificationLevel::Info,
                        NotificationCategory::Generator,
                        format!("Note: {}", pitch),
                    );
                }
            }
        }
    }

    fn chord_step(&mut self) {
        let allowed = self.params.allowed_pitches();
        let params = self.params.chord_params();
        match generate_chord(&allowed, &params, &mut self.rng) {
            StepOutcome::Unplayable => debug!("Fewer than three allowed pitches, chord skipped"),
            StepOutcome::Rest => self.notify(
                NotificationLevel::Info,
                NotificationCategory::Generator,
                "Rest (no note played)",
            ),
            StepOutcome::Played(voicing) => self.sound_chord(voicing),
        }
    }

    fn sound_chord(&mut self, voicing: ChordVoicing) {
        let now = self.clock.now();
        for note in &voicing.notes {
            self.sound(
                note.pitch,
                now + note.onset_offset,
                PlayParams {
                    duration_seconds: note.duration,
                    gain: note.gain,
                },
            );
        }
        let event = voicing.to_event();
        self.notify(
            NotificationLevel::Info,
            NotificationCategory::Generator,
            format!("Chord: {}", event),
        );
        self.record(event, now);
    }

    /// Live note path: gain = velocity x varied intensity, and the note is
    /// recorded when a recording is running
    fn play_note(&mut self, pitch: Pitch, velocity: f32) {
        if !self.is_instrument_ready() {
            return;
        }
        let gain = velocity * varied_intensity(&mut self.rng, self.params.intensity);
        let now = self.clock.now();
        self.sound(
            pitch,
            now,
            PlayParams {
                duration_seconds: NOTE_DURATION_SECONDS,
                gain,
            },
        );
        self.record(Event::note(pitch, gain), now);
    }

    fn replay_event(&mut self, event: Event) {
        let velocity = event.velocity();
        for pitch in event.pitches() {
            self.play_note(pitch, velocity);
        }
    }

    fn sound(&mut self, pitch: Pitch, when: f64, params: PlayParams) {
        if let Err(e) = self.instrument.play(pitch, when, params) {
            warn!(%pitch, "Note not played: {}", e);
        }
    }

    fn record(&mut self, event: Event, now: f64) {
        if let Some(count) = self.recorder.record(event, now, &mut self.bank) {
            debug!(count, "Event recorded");
        }
    }

    // ===== Status =====

    fn notify(
        &mut self,
        level: NotificationLevel,
        category: NotificationCategory,
        message: impl Into<String>,
    ) {
        let notification = Notification::new(level, category, message);
        self.status = notification.message.clone();
        if let Some(producer) = self.notifications.as_mut() {
            if producer.try_push(notification).is_err() {
                debug!("Notification channel full, status dropped");
            }
        }
    }
}
