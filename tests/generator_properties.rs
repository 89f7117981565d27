//! Properties of the scale filter and the generators
//!
//! Exhaustive over roots and modes, randomized over ranges and weights with
//! fixed seeds.

mod common;

use common::{Behaviour, run_for, session_with};
use mymusic_keyboard::generator::{
    ChordParams, IntervalWeights, NoteWalker, StepOutcome, WalkParams, WeightTable,
    generate_chord, weighted_choice,
};
use mymusic_keyboard::{
    GeneratorKind, Mode, NoteRange, PerformanceParams, Pitch, PitchClass, scale_notes,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_range(rng: &mut StdRng) -> NoteRange {
    let a = rng.gen_range(0..Pitch::COUNT);
    let b = rng.gen_range(0..Pitch::COUNT);
    NoteRange::new(
        Pitch::from_index(a.min(b)).unwrap(),
        Pitch::from_index(a.max(b)).unwrap(),
    )
}

#[test]
fn test_scale_notes_are_in_mode_range_and_sorted() {
    let mut rng = StdRng::seed_from_u64(7);
    for semitone in 0..12 {
        let root = PitchClass::new(semitone);
        for mode in Mode::ALL {
            for range in [NoteRange::full(), NoteRange::default(), random_range(&mut rng)] {
                let notes = scale_notes(root, mode, range);

                assert!(notes.windows(2).all(|pair| pair[0] < pair[1]));
                for pitch in &notes {
                    assert!(range.contains(*pitch));
                    assert!(mode.intervals().contains(&pitch.pitch_class().relative_to(root)));
                }
                // Nothing in range and in mode is left out
                let expected = Pitch::all()
                    .filter(|p| range.contains(*p))
                    .filter(|p| mode.contains(p.pitch_class().relative_to(root)))
                    .count();
                assert_eq!(notes.len(), expected);
            }
        }
    }
}

#[test]
fn test_full_keyboard_scale_sizes() {
    // C3..C6 covers three octaves plus the top C
    let c_major = scale_notes(PitchClass::C, Mode::Ionian, NoteRange::full());
    assert_eq!(c_major.len(), 22);
    let pentatonic = scale_notes(PitchClass::C, Mode::PentatonicMinor, NoteRange::full());
    assert_eq!(pentatonic.len(), 16);
    let chromatic = scale_notes(PitchClass::C, Mode::Chromatic, NoteRange::full());
    assert_eq!(chromatic.len(), Pitch::COUNT);
}

#[test]
fn test_inverted_range_yields_nothing() {
    let range = NoteRange::new("C5".parse().unwrap(), "C4".parse().unwrap());
    for mode in Mode::ALL {
        assert!(scale_notes(PitchClass::C, mode, range).is_empty());
    }
}

#[test]
fn test_weighted_choice_only_returns_weighted_keys() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..200 {
        let entries: Vec<(u8, u32)> = (0..8).map(|key| (key, rng.gen_range(0..4))).collect();
        let table = WeightTable::new(entries.clone(), 255);
        let total: u32 = entries.iter().map(|(_, w)| w).sum();

        for _ in 0..20 {
            let key = weighted_choice(&table, &mut rng);
            if total == 0 {
                assert_eq!(key, 255);
            } else {
                assert!(entries.iter().any(|&(k, w)| k == key && w > 0));
            }
        }
    }
}

#[test]
fn test_walker_cursor_stays_in_bounds() {
    let mut rng = StdRng::seed_from_u64(1234);
    let mut walker = NoteWalker::new();
    let weights = IntervalWeights::default();
    let params = WalkParams {
        intensity: 1.0,
        rest_probability: 10,
        intervals: &weights,
    };

    for _ in 0..50 {
        let root = PitchClass::new(rng.gen_range(0..12));
        let mode = Mode::ALL[rng.gen_range(0..Mode::ALL.len())];
        let allowed = scale_notes(root, mode, random_range(&mut rng));

        for _ in 0..40 {
            let outcome = walker.step(&allowed, &params, &mut rng);
            if allowed.is_empty() {
                assert_eq!(outcome, StepOutcome::Unplayable);
                continue;
            }
            if let StepOutcome::Played(event) = outcome {
                let index = walker.last_index().unwrap();
                assert!(index < allowed.len());
                assert_eq!(event.pitches(), vec![allowed[index]]);
            }
        }
    }
}

#[test]
fn test_chords_come_from_allowed_pitches() {
    let mut rng = StdRng::seed_from_u64(5);
    let params = ChordParams {
        intensity: 0.8,
        rest_probability: 0,
        humanize: true,
        timing_variation_ms: 20,
    };

    for _ in 0..200 {
        let root = PitchClass::new(rng.gen_range(0..12));
        let allowed = scale_notes(root, Mode::Dorian, random_range(&mut rng));
        match generate_chord(&allowed, &params, &mut rng) {
            StepOutcome::Played(voicing) => {
                assert!(allowed.len() >= 3);
                assert!((2..=3).contains(&voicing.notes.len()));
                for note in &voicing.notes {
                    assert!(allowed.contains(&note.pitch));
                    assert!(note.onset_offset.abs() < 0.02);
                }
            }
            StepOutcome::Unplayable => assert!(allowed.len() < 3),
            StepOutcome::Rest => panic!("no rest at 0%"),
        }
    }
}

#[test]
fn test_full_rest_probability_plays_nothing() {
    for kind in [GeneratorKind::Note, GeneratorKind::Chord] {
        let params = PerformanceParams {
            rest_probability: 100,
            ..Default::default()
        };
        let (mut session, player, clock) = session_with(params, Behaviour::Working, 0.0);
        session.start_loop(kind);
        run_for(&mut session, &clock, 20.0);
        session.play_random_note();
        session.play_chord();

        assert_eq!(player.count(), 0, "{kind} loop played at 100% rest");
        assert_eq!(session.status(), "Rest (no note played)");
        assert!(session.transport().is_looping());
    }
}

#[test]
fn test_zero_rest_probability_always_plays() {
    let (mut session, player, _clock) =
        session_with(PerformanceParams::default(), Behaviour::Working, 0.0);
    for step in 1..=50 {
        session.play_random_note();
        assert_eq!(player.count(), step);
    }

    let before = player.count();
    for _ in 0..50 {
        let played = player.count();
        session.play_chord();
        assert!((2..=3).contains(&(player.count() - played)));
    }
    assert!(player.count() >= before + 100);
}

#[test]
fn test_played_gain_follows_intensity() {
    let params = PerformanceParams {
        intensity: 0.0,
        ..Default::default()
    };
    let (mut session, player, _clock) = session_with(params, Behaviour::Working, 0.0);
    session.play_random_note();
    session.play_chord();
    session.press_key("G4".parse().unwrap());

    assert!(player.notes().iter().all(|note| note.gain == 0.0));
}

#[test]
fn test_nan_intensity_never_reaches_generators() {
    let params = PerformanceParams {
        intensity: f32::NAN,
        ..Default::default()
    };
    let (mut session, player, _clock) = session_with(params, Behaviour::Working, 0.0);
    assert_eq!(session.params().intensity, 0.8);

    session.set_intensity(f32::NAN);
    assert_eq!(session.params().intensity, 0.8);

    session.play_random_note();
    session.play_chord();
    session.press_key("E4".parse().unwrap());
    assert!(player.count() >= 4);
    assert!(player.notes().iter().all(|note| note.gain.is_finite()));
}
