// Shared helpers for integration tests: a note player that logs every note
// and a driver that walks a manual clock through the session timers.

#![allow(dead_code)]

use mymusic_keyboard::{
    AudioError, Clock, ManualClock, NotePlayer, PerformanceParams, Pitch, PlayParams, Session,
};
use std::sync::{Arc, Mutex};

/// One note handed to the instrument
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayedNote {
    pub pitch: Pitch,
    pub when: f64,
    pub gain: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behaviour {
    Working,
    FailsToLoad,
    FailsToPlay,
}

/// Instrument double. Clones share the same log.
#[derive(Debug, Clone)]
pub struct LoggingPlayer {
    log: Arc<Mutex<Vec<PlayedNote>>>,
    behaviour: Behaviour,
    ready: bool,
}

impl LoggingPlayer {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            behaviour,
            ready: false,
        }
    }

    pub fn notes(&self) -> Vec<PlayedNote> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

impl NotePlayer for LoggingPlayer {
    fn prepare(&mut self) -> Result<(), AudioError> {
        match self.behaviour {
            Behaviour::FailsToLoad => Err(AudioError::Load("no such instrument".to_string())),
            _ => {
                self.ready = true;
                Ok(())
            }
        }
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn play(&mut self, pitch: Pitch, when: f64, params: PlayParams) -> Result<(), AudioError> {
        if self.behaviour == Behaviour::FailsToPlay {
            return Err(AudioError::Poisoned);
        }
        self.log.lock().unwrap().push(PlayedNote {
            pitch,
            when,
            gain: params.gain,
        });
        Ok(())
    }
}

/// Session over a logging player and a manual clock starting at `start` seconds
pub fn session_with(
    params: PerformanceParams,
    behaviour: Behaviour,
    start: f64,
) -> (Session, LoggingPlayer, ManualClock) {
    let player = LoggingPlayer::new(behaviour);
    let clock = ManualClock::new();
    clock.set_seconds(start);
    let session = Session::builder()
        .params(params)
        .seed(42)
        .build(player.clone(), clock.clone());
    (session, player, clock)
}

/// Move the clock forward `seconds`, stopping on every timer deadline on the
/// way so each task fires at its exact due time
pub fn run_for(session: &mut Session, clock: &ManualClock, seconds: f64) {
    let end = clock.now() + seconds;
    while let Some(deadline) = session.next_deadline() {
        if deadline > end {
            break;
        }
        clock.set_seconds(deadline);
        session.run_pending();
    }
    clock.set_seconds(end);
    session.run_pending();
}

/// Jump the clock to an absolute time without firing timers
pub fn jump_to(clock: &ManualClock, seconds: f64) {
    clock.set_seconds(seconds);
}
