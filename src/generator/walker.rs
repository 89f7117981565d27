// Note walker - Random walk over the allowed pitches
// The cursor is an index into whatever allowed sequence the caller passes in,
// so it is not a pitch identity: a new root, mode or range reinterprets it.

use super::weights::{IntervalWeights, should_rest};
use super::{StepOutcome, varied_intensity};
use crate::sequencer::event::Event;
use crate::theory::Pitch;
use rand::Rng;

/// Base gain of a walked note before intensity scaling
const BASE_GAIN: f32 = 0.7;

/// Half-width of the random jitter applied to the base gain
const BASE_GAIN_JITTER: f32 = 0.15;

/// Live parameters read on every step
#[derive(Debug, Clone, Copy)]
pub struct WalkParams<'a> {
    /// Dynamic intensity in 0.0..=1.0
    pub intensity: f32,
    /// Percentage (0..=100) of steps that rest
    pub rest_probability: u8,
    pub intervals: &'a IntervalWeights,
}

/// Stateful random-walk note generator
#[derive(Debug, Clone, Default)]
pub struct NoteWalker {
    last_index: Option<usize>,
}

impl NoteWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the last played note in the allowed sequence
    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    /// Forget the cursor; the next step picks a random starting note
    pub fn reset(&mut self) {
        self.last_index = None;
    }

    /// Produce the next note.
    ///
    /// An empty `allowed` slice is a no-op. A rest leaves the cursor where it
    /// was. Otherwise the cursor moves by `round(interval / 2)` positions in a
    /// random direction, clamped to the sequence bounds.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        allowed: &[Pitch],
        params: &WalkParams<'_>,
        rng: &mut R,
    ) -> StepOutcome<Event> {
        if allowed.is_empty() {
            return StepOutcome::Unplayable;
        }
        if should_rest(rng, params.rest_probability) {
            return StepOutcome::Rest;
        }

        let last = allowed.len() - 1;
        let next = match self.last_index {
            None => rng.gen_range(0..allowed.len()),
            Some(previous) => {
                let interval = params.intervals.choose(rng) as i64;
                let direction: i64 = if rng.gen_bool(0.5) { -1 } else { 1 };
                // Scale steps are roughly two semitones wide
                let moved = previous as i64 + direction * ((interval + 1) / 2);
                moved.clamp(0, last as i64) as usize
            }
        };
        self.last_index = Some(next);

        let jitter = BASE_GAIN + rng.gen_range(-BASE_GAIN_JITTER..BASE_GAIN_JITTER);
        let velocity = jitter * varied_intensity(rng, params.intensity);
        StepOutcome::Played(Event::note(allowed[next], velocity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::weights::IntervalSlider;
    use crate::theory::{Mode, NoteRange, PitchClass, scale_notes};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn c_major() -> Vec<Pitch> {
        scale_notes(PitchClass::C, Mode::Ionian, NoteRange::default())
    }

    #[test]
    fn test_empty_range_is_noop() {
        let mut rng = StdRng::seed_from_u64(1);
        let weights = IntervalWeights::default();
        let params = WalkParams {
            intensity: 0.8,
            rest_probability: 0,
            intervals: &weights,
        };
        let mut walker = NoteWalker::new();

        assert_eq!(walker.step(&[], &params, &mut rng), StepOutcome::Unplayable);
        assert_eq!(walker.last_index(), None);
    }

    #[test]
    fn test_first_step_sets_cursor() {
        let mut rng = StdRng::seed_from_u64(2);
        let weights = IntervalWeights::default();
        let params = WalkParams {
            intensity: 0.8,
            rest_probability: 0,
            intervals: &weights,
        };
        let allowed = c_major();
        let mut walker = NoteWalker::new();

        let event = walker.step(&allowed, &params, &mut rng).played().unwrap();
        let index = walker.last_index().unwrap();
        match event {
            Event::Note { pitch, duration, .. } => {
                assert_eq!(pitch, allowed[index]);
                assert_eq!(duration, 1.2);
            }
            other => panic!("Expected a note, got {:?}", other),
        }
    }

    #[test]
    fn test_rest_keeps_cursor() {
        let mut rng = StdRng::seed_from_u64(3);
        let weights = IntervalWeights::default();
        let allowed = c_major();
        let mut walker = NoteWalker::new();

        let playing = WalkParams {
            intensity: 0.8,
            rest_probability: 0,
            intervals: &weights,
        };
        walker.step(&allowed, &playing, &mut rng);
        let before = walker.last_index();

        let resting = WalkParams {
            rest_probability: 100,
            ..playing
        };
        for _ in 0..50 {
            assert_eq!(walker.step(&allowed, &resting, &mut rng), StepOutcome::Rest);
        }
        assert_eq!(walker.last_index(), before);
    }

    #[test]
    fn test_unison_only_repeats_note() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut weights = IntervalWeights::default();
        for slider in IntervalSlider::ALL {
            weights.set_slider(slider, 0);
        }
        // The sixth slider keeps the octave at weight 1, clear it directly
        weights.set_distance(12, 0);
        weights.set_slider(IntervalSlider::Unison, 10);

        let params = WalkParams {
            intensity: 0.8,
            rest_probability: 0,
            intervals: &weights,
        };
        let allowed = c_major();
        let mut walker = NoteWalker::new();
        walker.step(&allowed, &params, &mut rng);
        let start = walker.last_index();

        for _ in 0..20 {
            walker.step(&allowed, &params, &mut rng);
            assert_eq!(walker.last_index(), start);
        }
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut weights = IntervalWeights::default();
        weights.set_slider(IntervalSlider::Sixth, 100);
        let params = WalkParams {
            intensity: 1.0,
            rest_probability: 0,
            intervals: &weights,
        };
        let allowed = c_major();
        let mut walker = NoteWalker::new();

        for _ in 0..2000 {
            walker.step(&allowed, &params, &mut rng);
            let index = walker.last_index().unwrap();
            assert!(index < allowed.len());
        }
    }

    #[test]
    fn test_velocity_range() {
        let mut rng = StdRng::seed_from_u64(6);
        let weights = IntervalWeights::default();
        let params = WalkParams {
            intensity: 1.0,
            rest_probability: 0,
            intervals: &weights,
        };
        let allowed = c_major();
        let mut walker = NoteWalker::new();

        for _ in 0..500 {
            let event = walker.step(&allowed, &params, &mut rng).played().unwrap();
            let velocity = event.velocity();
            // (0.7 +/- 0.15) * [0.5, 1.0]
            assert!(velocity >= 0.55 * 0.5 - 1e-6);
            assert!(velocity <= 0.85 + 1e-6);
        }
    }

    #[test]
    fn test_stale_cursor_is_clamped() {
        let mut rng = StdRng::seed_from_u64(8);
        let weights = IntervalWeights::default();
        let params = WalkParams {
            intensity: 0.5,
            rest_probability: 0,
            intervals: &weights,
        };
        let wide = scale_notes(PitchClass::C, Mode::Chromatic, NoteRange::full());
        let mut walker = NoteWalker::new();
        while walker.last_index().unwrap_or(0) < 20 {
            walker.step(&wide, &params, &mut rng);
        }

        // Narrowing the range keeps the raw index; the next step clamps it
        let narrow = c_major();
        walker.step(&narrow, &params, &mut rng);
        assert!(walker.last_index().unwrap() < narrow.len());
    }
}
