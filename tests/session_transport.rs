//! Transport behaviour of a full session
//!
//! Recording, pattern playback at rescaled tempo, the generator loop and the
//! way they exclude or coexist with each other, driven on a manual clock.

mod common;

use common::{Behaviour, LoggingPlayer, jump_to, run_for, session_with};
use mymusic_keyboard::{
    Command, GeneratorKind, ManualClock, PerformanceParams, Pitch, Session, SlotId,
    create_notification_channel,
};
use ringbuf::traits::Consumer;

fn working_session(start: f64) -> (Session, LoggingPlayer, ManualClock) {
    session_with(PerformanceParams::default(), Behaviour::Working, start)
}

fn pitch(name: &str) -> Pitch {
    name.parse().unwrap()
}

/// Record C4, E4, G4 into slot A at 1.0 s, 1.5 s and 2.25 s (90 BPM)
fn record_arpeggio(session: &mut Session, clock: &ManualClock) {
    jump_to(clock, 1.0);
    session.start_recording();
    session.press_key(pitch("C4"));
    jump_to(clock, 1.5);
    session.press_key(pitch("E4"));
    jump_to(clock, 2.25);
    session.press_key(pitch("G4"));
    jump_to(clock, 3.0);
    session.stop_recording();
}

#[test]
fn test_recorded_times_are_relative_and_ordered() {
    let (mut session, _player, clock) = working_session(0.0);
    record_arpeggio(&mut session, &clock);

    let slot = session.pattern(SlotId::A);
    let times: Vec<f64> = slot.events().iter().map(|e| e.time).collect();
    assert_eq!(times, vec![0.0, 0.5, 1.25]);
    assert_eq!(slot.record_bpm(), 90);
    assert_eq!(session.status(), "Pattern recorded.");
}

#[test]
fn test_loop_recording_timestamps_never_decrease() {
    let (mut session, _player, clock) = working_session(2.0);
    session.start_recording();
    session.start_loop(GeneratorKind::Note);
    run_for(&mut session, &clock, 12.0);
    session.stop_loop();
    session.stop_recording();

    let events = session.pattern(SlotId::A).events();
    assert!(events.len() > 3);
    assert_eq!(events[0].time, 0.0);
    assert!(events.windows(2).all(|pair| pair[0].time <= pair[1].time));
    assert!(events.iter().all(|e| e.time <= 12.0));
}

#[test]
fn test_playback_at_recording_tempo_reproduces_delays() {
    let (mut session, player, clock) = working_session(0.0);
    record_arpeggio(&mut session, &clock);

    jump_to(&clock, 10.0);
    let before = player.count();
    session.play_pattern();
    assert_eq!(session.status(), "Playing Pattern A...");
    assert!(session.transport().is_playing_pattern());
    run_for(&mut session, &clock, 2.0);

    let replayed = &player.notes()[before..];
    let offsets: Vec<f64> = replayed.iter().map(|n| n.when - 10.0).collect();
    let pitches: Vec<Pitch> = replayed.iter().map(|n| n.pitch).collect();
    assert_eq!(pitches, vec![pitch("C4"), pitch("E4"), pitch("G4")]);
    for (offset, expected) in offsets.iter().zip([0.0, 0.5, 1.25]) {
        assert!((offset - expected).abs() < 1e-9, "offset {offset} vs {expected}");
    }
    assert_eq!(session.status(), "Pattern A playback done.");
    assert!(session.transport().is_idle());
}

#[test]
fn test_playback_at_double_tempo_halves_delays() {
    let (mut session, player, clock) = working_session(0.0);
    record_arpeggio(&mut session, &clock);

    session.set_tempo(180);
    jump_to(&clock, 10.0);
    let before = player.count();
    session.play_pattern();

    // Last note at 0.625 s, completion 120 ms later
    run_for(&mut session, &clock, 0.7);
    assert!(session.transport().is_playing_pattern());
    run_for(&mut session, &clock, 0.1);
    assert!(!session.transport().is_playing_pattern());

    let offsets: Vec<f64> = player.notes()[before..].iter().map(|n| n.when - 10.0).collect();
    assert_eq!(offsets.len(), 3);
    for (offset, expected) in offsets.iter().zip([0.0, 0.25, 0.625]) {
        assert!((offset - expected).abs() < 1e-9);
    }
}

#[test]
fn test_empty_pattern_does_not_play() {
    let (mut session, _player, _clock) = working_session(0.0);
    session.select_slot(SlotId::C);
    session.play_pattern();

    assert_eq!(session.status(), "Pattern C is empty.");
    assert_eq!(session.pending_timers(), 0);
    assert!(session.transport().is_idle());
}

#[test]
fn test_starting_loop_cancels_pattern_playback() {
    let (mut session, player, clock) = working_session(0.0);
    record_arpeggio(&mut session, &clock);

    jump_to(&clock, 10.0);
    session.play_pattern();
    run_for(&mut session, &clock, 0.1);
    let replayed_before_loop = player.notes().iter().filter(|n| n.when >= 10.0).count();
    assert_eq!(replayed_before_loop, 1);

    session.start_loop(GeneratorKind::Chord);
    let transport = session.transport();
    assert!(!transport.is_playing_pattern());
    assert_eq!(transport.looping, Some(GeneratorKind::Chord));
    assert_eq!(session.pending_timers(), 1);

    run_for(&mut session, &clock, 5.0);
    assert_ne!(session.status(), "Pattern A playback done.");
    assert_eq!(session.pending_timers(), 1);
}

#[test]
fn test_playing_pattern_stops_loop() {
    let (mut session, _player, clock) = working_session(0.0);
    record_arpeggio(&mut session, &clock);

    session.start_loop(GeneratorKind::Note);
    run_for(&mut session, &clock, 1.0);
    session.play_pattern();

    let transport = session.transport();
    assert!(!transport.is_looping());
    assert_eq!(transport.playing_pattern, Some(SlotId::A));
    // Three events plus the completion timer, no loop tick
    assert_eq!(session.pending_timers(), 4);
}

#[test]
fn test_recording_keeps_running_loop() {
    let (mut session, _player, clock) = working_session(0.0);
    session.start_loop(GeneratorKind::Note);
    run_for(&mut session, &clock, 0.5);
    session.start_recording();

    let transport = session.transport();
    assert_eq!(transport.recording, Some(SlotId::A));
    assert_eq!(transport.looping, Some(GeneratorKind::Note));

    run_for(&mut session, &clock, 6.0);
    session.stop_recording();
    assert!(!session.pattern(SlotId::A).is_empty());
    assert!(session.transport().is_looping());
}

#[test]
fn test_start_recording_twice_keeps_events() {
    let (mut session, _player, clock) = working_session(0.0);
    session.start_recording();
    session.press_key(pitch("D4"));
    jump_to(&clock, 0.5);
    session.start_recording();
    session.press_key(pitch("F4"));
    session.stop_recording();

    let times: Vec<f64> = session.pattern(SlotId::A).events().iter().map(|e| e.time).collect();
    assert_eq!(times, vec![0.0, 0.5]);
}

#[test]
fn test_switching_slot_stops_recording() {
    let (mut session, _player, clock) = working_session(0.0);
    session.start_recording();
    session.press_key(pitch("A4"));
    jump_to(&clock, 0.3);
    session.select_slot(SlotId::B);

    assert!(!session.transport().is_recording());
    assert_eq!(session.active_slot(), SlotId::B);
    assert_eq!(session.pattern(SlotId::A).len(), 1);
    assert!(session.pattern(SlotId::B).is_empty());

    // Later notes land nowhere
    session.press_key(pitch("B4"));
    assert_eq!(session.pattern(SlotId::A).len(), 1);
    assert!(session.pattern(SlotId::B).is_empty());
}

#[test]
fn test_recording_restart_clears_slot() {
    let (mut session, _player, clock) = working_session(0.0);
    record_arpeggio(&mut session, &clock);
    assert_eq!(session.pattern(SlotId::A).len(), 3);

    session.set_tempo(120);
    session.start_recording();
    assert!(session.pattern(SlotId::A).is_empty());
    session.stop_recording();
    assert_eq!(session.status(), "Recording stopped (empty).");
    assert_eq!(session.pattern(SlotId::A).record_bpm(), 120);
}

#[test]
fn test_replay_while_recording_is_recorded_again() {
    let (mut session, _player, clock) = working_session(0.0);
    session.start_recording();
    session.press_key(pitch("C4"));
    jump_to(&clock, 0.2);
    session.press_key(pitch("D4"));

    jump_to(&clock, 0.3);
    session.play_pattern();
    assert!(session.transport().is_recording());
    run_for(&mut session, &clock, 1.0);
    session.stop_recording();

    let slot = session.pattern(SlotId::A);
    assert_eq!(slot.len(), 4);
    let times: Vec<f64> = slot.events().iter().map(|e| e.time).collect();
    assert!((times[2] - 0.3).abs() < 1e-9);
    assert!((times[3] - 0.5).abs() < 1e-9);
}

#[test]
fn test_clear_pattern() {
    let (mut session, _player, clock) = working_session(0.0);
    record_arpeggio(&mut session, &clock);
    session.play_pattern();
    session.clear_pattern();

    assert_eq!(session.status(), "Cleared Pattern A.");
    assert!(session.pattern(SlotId::A).is_empty());
    assert_eq!(session.pending_timers(), 0);
}

#[test]
fn test_tempo_change_restarts_running_loop() {
    let (mut session, player, clock) = working_session(0.0);
    session.start_loop(GeneratorKind::Note);
    assert_eq!(player.count(), 1);
    run_for(&mut session, &clock, 0.1);

    let played = player.count();
    session.set_tempo(120);
    // The restarted loop plays its first step right away
    assert_eq!(player.count(), played + 1);
    assert_eq!(session.transport().looping, Some(GeneratorKind::Note));
    assert_eq!(session.pending_timers(), 1);

    // Longest note value is a whole note: four beats of 500 ms
    let next = session.next_deadline().unwrap();
    assert!(next - session.now() <= 2.0 + 1e-9);
}

#[test]
fn test_tempo_change_without_loop_schedules_nothing() {
    let (mut session, player, _clock) = working_session(0.0);
    session.set_tempo(150);
    assert_eq!(session.params().tempo.bpm(), 150);
    assert_eq!(session.pending_timers(), 0);
    assert_eq!(player.count(), 0);
}

#[test]
fn test_loop_start_is_idempotent_and_stop_clears_timer() {
    let (mut session, player, clock) = working_session(0.0);
    session.start_loop(GeneratorKind::Note);
    session.start_loop(GeneratorKind::Chord);
    assert_eq!(session.transport().looping, Some(GeneratorKind::Note));
    assert_eq!(player.count(), 1);

    session.stop_loop();
    assert_eq!(session.status(), "Stopped loop playback.");
    assert_eq!(session.pending_timers(), 0);

    let played = player.count();
    run_for(&mut session, &clock, 10.0);
    assert_eq!(player.count(), played);
}

#[test]
fn test_instrument_failure_silences_session() {
    let (mut session, player, clock) =
        session_with(PerformanceParams::default(), Behaviour::FailsToLoad, 0.0);
    assert!(!session.is_instrument_ready());
    assert!(session.status().starts_with("Error loading instrument:"));

    session.play_random_note();
    session.play_chord();
    session.press_key(pitch("C4"));
    session.start_loop(GeneratorKind::Note);
    run_for(&mut session, &clock, 3.0);

    assert_eq!(player.count(), 0);
    assert!(session.transport().is_idle());
    assert_eq!(session.pending_timers(), 0);
}

#[test]
fn test_play_errors_do_not_stop_loop() {
    let (mut session, _player, clock) =
        session_with(PerformanceParams::default(), Behaviour::FailsToPlay, 0.0);
    assert!(session.is_instrument_ready());

    session.start_loop(GeneratorKind::Chord);
    run_for(&mut session, &clock, 8.0);
    assert!(session.transport().is_looping());
    assert_eq!(session.pending_timers(), 1);
}

#[test]
fn test_commands_drive_session() {
    let (mut session, player, clock) = working_session(0.0);
    for line in ["slot b", "record start", "key E4", "record stop"] {
        session.apply(line.parse::<Command>().unwrap());
    }
    assert_eq!(session.pattern(SlotId::B).len(), 1);
    assert_eq!(player.notes()[0].pitch, pitch("E4"));

    session.apply("tempo 60".parse::<Command>().unwrap());
    session.apply("pattern play".parse::<Command>().unwrap());
    run_for(&mut session, &clock, 1.0);
    assert_eq!(player.count(), 2);

    session.apply("status".parse::<Command>().unwrap());
    assert!(session.status().contains("60 BPM"));
}

#[test]
fn test_status_changes_are_published() {
    let (producer, mut consumer) = create_notification_channel(32);
    let player = LoggingPlayer::new(Behaviour::Working);
    let clock = ManualClock::new();
    let mut session = Session::builder()
        .seed(3)
        .notifications(producer)
        .build(player, clock.clone());

    session.start_loop(GeneratorKind::Note);
    session.stop_loop();

    let mut messages = Vec::new();
    while let Some(notification) = consumer.try_pop() {
        messages.push(notification.message);
    }
    assert_eq!(messages.first().map(String::as_str), Some("Instrument loaded."));
    assert!(messages.iter().any(|m| m == "Note loop running..."));
    assert!(messages.iter().any(|m| m.starts_with("Note: ")));
    assert_eq!(messages.last().map(String::as_str), Some("Stopped loop playback."));
}

#[test]
fn test_stopping_recording_publishes_slot_summary() {
    let (producer, mut consumer) = create_notification_channel(32);
    let clock = ManualClock::new();
    let mut session = Session::builder()
        .seed(4)
        .notifications(producer)
        .build(LoggingPlayer::new(Behaviour::Working), clock.clone());

    session.start_recording();
    session.press_key(pitch("C4"));
    jump_to(&clock, 0.75);
    session.press_key(pitch("G4"));
    session.stop_recording();

    let messages: Vec<String> = std::iter::from_fn(|| consumer.try_pop())
        .map(|notification| notification.message)
        .collect();
    let tail = &messages[messages.len() - 2..];
    assert_eq!(tail[0], "Active Pattern: A | 2 events (0.75s @ 90 BPM).");
    assert_eq!(tail[1], "Pattern recorded.");
    assert_eq!(session.status(), "Pattern recorded.");
}
