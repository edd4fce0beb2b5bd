// Motive generation: turning generators into a bar of chords.
//
// Inputs are a requested number of attacks, a metrum slice (the admissible
// time points of one bar, from `Metrum::lookup_weights`), and generators for
// beat position, duration, velocity and one pitch per voice. The output is
// a gapless run of chords and rests covering the slice exactly.
//
// The procedure:
// 1. Draw `hits + 1` raw beat values and sort them. Their spread sets
//    `max_dur`, a cap on any single chord measured in slice steps.
// 2. Fold the raw values onto slice indices modulo `len - 1` and dedupe.
//    Collisions mean fewer attacks than requested; that is expected.
// 3. Rest from the slice start up to the first attack.
// 4. For each pair of consecutive attack indices, draw the voices' pitches,
//    take the duration generator's value as a percentage of the index gap
//    (at least one step, at most `max_dur` and the gap), convert those
//    steps back into time through the slice, and fill the remainder of the
//    gap with a rest.
// 5. Rest from the last attack to the end of the slice.
//
// The last attack index only closes the previous chord; nothing sounds from
// it. Durations telescope, so their sum is always `slice[last] - slice[0]`.

use crate::error::{MusicError, Result};
use crate::generator::IntGenerator;
use crate::rational::Rational;
use crate::track::{Chord, midi_key, midi_velocity};
use log::debug;
use std::collections::BTreeSet;

/// Generate one motive over `metrum`.
///
/// `pitches` is the pitch material (a register of a harmony, or a fixed
/// drum-key list); each voice generator's value is reduced modulo its
/// length to pick a key.
///
/// Fails with `InvalidArgument` when the slice has fewer than two points or
/// is not strictly increasing, or when voices must draw from an empty pitch
/// list, and with `PitchOutOfRange` when a drawn pitch is not a MIDI key.
pub fn generate_motive(
    hits: usize,
    metrum: &[Rational],
    beat: &mut dyn IntGenerator,
    duration: &mut dyn IntGenerator,
    velocity: &mut dyn IntGenerator,
    pitches: &[i32],
    melodies: &mut [Box<dyn IntGenerator>],
) -> Result<Vec<Chord>> {
    if metrum.len() <= 1 {
        return Err(MusicError::invalid(format!(
            "motive needs at least two metrum points, got {}",
            metrum.len()
        )));
    }
    if metrum.windows(2).any(|w| w[0] >= w[1]) {
        return Err(MusicError::invalid("metrum slice must be strictly increasing"));
    }

    let mut raw: Vec<i64> = (0..=hits).map(|_| beat.next()).collect();
    raw.sort_unstable();
    let spread = raw[raw.len() - 1] as i128 - raw[0] as i128;
    let max_dur = (2 * spread).div_euclid(raw.len() as i128);

    let modulus = (metrum.len() - 1) as i64;
    let attacks: Vec<usize> = raw
        .iter()
        .map(|&b| b.rem_euclid(modulus) as usize)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    debug!(
        "motive: {} of {} requested attacks over {} points, max_dur {}",
        attacks.len(),
        hits,
        metrum.len(),
        max_dur
    );

    let mut chords = Vec::with_capacity(2 * attacks.len() + 1);

    let first = attacks[0];
    let lead = metrum[first] - metrum[0];
    if lead.is_positive() {
        chords.push(Chord::rest(lead));
    }

    for pair in attacks.windows(2) {
        let (here, next) = (pair[0], pair[1]);

        let mut keys = Vec::with_capacity(melodies.len());
        for melody in melodies.iter_mut() {
            if pitches.is_empty() {
                return Err(MusicError::invalid("no pitches available for the motive voices"));
            }
            let choice = melody.next().rem_euclid(pitches.len() as i64) as usize;
            keys.push(midi_key(pitches[choice] as i64)?);
        }

        let gap = (next - here) as i128;
        let percent = duration.next() as i128;
        let steps = (percent * gap).div_euclid(100).max(1).min(max_dur).clamp(1, gap) as usize;

        let sounding = metrum[here + steps] - metrum[here];
        chords.push(Chord::new(keys, sounding, midi_velocity(velocity.next())));

        let full = metrum[next] - metrum[here];
        if sounding < full {
            chords.push(Chord::rest(full - sounding));
        }
    }

    let last = attacks[attacks.len() - 1];
    let end = metrum[metrum.len() - 1];
    if metrum[last] < end {
        chords.push(Chord::rest(end - metrum[last]));
    }

    Ok(chords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{Lin, RangePolicy, Rnd, Walk};
    use crate::metrum::Metrum;
    use ramify_prng::SeededRng;

    fn total(chords: &[Chord]) -> Rational {
        chords.iter().map(Chord::duration).sum()
    }

    fn one_voice() -> Vec<Box<dyn IntGenerator>> {
        vec![Box::new(Lin::constant(0))]
    }

    #[test]
    fn evenly_spaced_hits_on_quarters() {
        // Quarters of a 4/4 bar; beats at indices 0, 1, 2, 3 (and 4 folds to 0).
        let slice = Metrum::new(&[4, 2]).unwrap().lookup_weights(Some(1), None);
        let chords = generate_motive(
            4,
            &slice,
            &mut Lin::new(0, 1),
            &mut Lin::constant(100),
            &mut Lin::constant(90),
            &[36],
            &mut one_voice(),
        )
        .unwrap();

        // Attacks at 0, 1, 2 each ring one beat; index 3 closes the last
        // chord and the final beat is a rest.
        assert_eq!(chords.len(), 4);
        for chord in &chords[..3] {
            assert_eq!(chord.pitches(), &[36]);
            assert_eq!(chord.duration(), Rational::from_int(1));
            assert_eq!(chord.velocity(), 90);
        }
        assert!(chords[3].is_rest());
        assert_eq!(total(&chords), Rational::from_int(4));
    }

    #[test]
    fn leading_rest_before_first_attack() {
        let slice: Vec<Rational> = (0..=4).map(Rational::from_int).collect();
        // Raw beats 2, 3 -> indices 2, 3.
        let chords = generate_motive(
            1,
            &slice,
            &mut Lin::new(2, 1),
            &mut Lin::constant(100),
            &mut Lin::constant(100),
            &[60],
            &mut one_voice(),
        )
        .unwrap();
        assert!(chords[0].is_rest());
        assert_eq!(chords[0].duration(), Rational::from_int(2));
        assert_eq!(total(&chords), Rational::from_int(4));
    }

    #[test]
    fn short_durations_leave_trailing_rests() {
        let slice: Vec<Rational> = (0..=8).map(|i| Rational::new(i, 2)).collect();
        // Raw beats 0, 4, 8 -> spread 8, max_dur 5; indices 0, 4 (8 folds to 0).
        let chords = generate_motive(
            2,
            &slice,
            &mut Lin::new(0, 4),
            &mut Lin::constant(50),
            &mut Lin::constant(64),
            &[48, 55],
            &mut one_voice(),
        )
        .unwrap();
        // 50% of a 4-step gap = 2 steps = 1 beat, then a 1-beat rest, then
        // the trailing 2-beat rest after the closing index.
        assert_eq!(chords.len(), 3);
        assert_eq!(chords[0].pitches(), &[48]);
        assert_eq!(chords[0].duration(), Rational::from_int(1));
        assert!(chords[1].is_rest());
        assert_eq!(chords[1].duration(), Rational::from_int(1));
        assert!(chords[2].is_rest());
        assert_eq!(chords[2].duration(), Rational::from_int(2));
    }

    #[test]
    fn duration_is_capped_by_hit_spread() {
        let slice: Vec<Rational> = (0..=10).map(Rational::from_int).collect();
        // Raw beats 0 and 9: max_dur = 2 * 9 / 2 = 9, gap 9, 100% -> 9 steps.
        let mut beats = [9i64, 0].into_iter();
        let mut beat = move || beats.next().unwrap_or(0);
        let chords = generate_motive(
            1,
            &slice,
            &mut beat,
            &mut Lin::constant(100),
            &mut Lin::constant(80),
            &[60],
            &mut one_voice(),
        )
        .unwrap();
        assert_eq!(chords[0].duration(), Rational::from_int(9));

        // Raw beats 0, 1, 2, 9: max_dur = 2 * 9 / 4 = 4; gap 7 between 2 and
        // 9 at 100% would be 7 steps, capped to 4.
        let mut beats = [0i64, 1, 2, 9].into_iter();
        let mut beat = move || beats.next().unwrap_or(0);
        let chords = generate_motive(
            3,
            &slice,
            &mut beat,
            &mut Lin::constant(100),
            &mut Lin::constant(80),
            &[60],
            &mut one_voice(),
        )
        .unwrap();
        let sounding: Vec<Rational> = chords
            .iter()
            .filter(|c| !c.is_rest())
            .map(Chord::duration)
            .collect();
        assert_eq!(sounding, vec![
            Rational::from_int(1),
            Rational::from_int(1),
            Rational::from_int(4),
        ]);
        assert_eq!(total(&chords), Rational::from_int(10));
    }

    #[test]
    fn oversized_percentages_never_overlap_next_attack() {
        let slice: Vec<Rational> = (0..=12).map(Rational::from_int).collect();
        let chords = generate_motive(
            6,
            &slice,
            &mut Lin::new(0, 2),
            &mut Lin::constant(400),
            &mut Lin::constant(80),
            &[60],
            &mut one_voice(),
        )
        .unwrap();
        for chord in chords.iter().filter(|c| !c.is_rest()) {
            assert_eq!(chord.duration(), Rational::from_int(2));
        }
        assert_eq!(total(&chords), Rational::from_int(12));
    }

    #[test]
    fn collisions_reduce_attack_count() {
        let slice: Vec<Rational> = (0..=4).map(Rational::from_int).collect();
        // Every raw beat folds onto index 1.
        let chords = generate_motive(
            5,
            &slice,
            &mut Lin::new(1, 4),
            &mut Lin::constant(100),
            &mut Lin::constant(80),
            &[60],
            &mut one_voice(),
        )
        .unwrap();
        assert!(chords.iter().all(Chord::is_rest));
        assert_eq!(total(&chords), Rational::from_int(4));
    }

    #[test]
    fn zero_hits_still_draws_one_beat() {
        let slice: Vec<Rational> = (0..=4).map(Rational::from_int).collect();
        let mut calls = 0;
        let mut beat = || {
            calls += 1;
            0i64
        };
        let chords = generate_motive(
            0,
            &slice,
            &mut beat,
            &mut Lin::constant(100),
            &mut Lin::constant(100),
            &[60],
            &mut one_voice(),
        )
        .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(chords, vec![Chord::rest(Rational::from_int(4))]);
    }

    #[test]
    fn multiple_voices_form_chords() {
        let slice: Vec<Rational> = (0..=2).map(Rational::from_int).collect();
        let pad = [48, 52, 55, 60];
        let mut voices: Vec<Box<dyn IntGenerator>> = (0..4)
            .map(|v| Box::new(Lin::constant(v)) as Box<dyn IntGenerator>)
            .collect();
        let chords = generate_motive(
            1,
            &slice,
            &mut Lin::new(0, 1),
            &mut Lin::constant(100),
            &mut Lin::constant(20),
            &pad,
            &mut voices,
        )
        .unwrap();
        assert_eq!(chords[0].pitches(), &[48, 52, 55, 60]);
    }

    #[test]
    fn voice_values_wrap_around_the_pitch_list() {
        let slice: Vec<Rational> = (0..=2).map(Rational::from_int).collect();
        let mut voices: Vec<Box<dyn IntGenerator>> =
            vec![Box::new(Lin::constant(-1)), Box::new(Lin::constant(5))];
        let chords = generate_motive(
            1,
            &slice,
            &mut Lin::new(0, 1),
            &mut Lin::constant(100),
            &mut Lin::constant(20),
            &[40, 41, 42],
            &mut voices,
        )
        .unwrap();
        assert_eq!(chords[0].pitches(), &[42]);
    }

    #[test]
    fn rejects_degenerate_slices() {
        for slice in [vec![], vec![Rational::zero()]] {
            let result = generate_motive(
                3,
                &slice,
                &mut Lin::new(0, 1),
                &mut Lin::constant(100),
                &mut Lin::constant(100),
                &[60],
                &mut one_voice(),
            );
            assert!(matches!(result, Err(MusicError::InvalidArgument(_))));
        }
        let unsorted = vec![Rational::from_int(1), Rational::zero()];
        let result = generate_motive(
            1,
            &unsorted,
            &mut Lin::new(0, 1),
            &mut Lin::constant(100),
            &mut Lin::constant(100),
            &[60],
            &mut one_voice(),
        );
        assert!(matches!(result, Err(MusicError::InvalidArgument(_))));
    }

    #[test]
    fn empty_pitch_material_is_an_error_once_a_chord_is_needed() {
        let slice: Vec<Rational> = (0..=4).map(Rational::from_int).collect();
        let result = generate_motive(
            2,
            &slice,
            &mut Lin::new(0, 1),
            &mut Lin::constant(100),
            &mut Lin::constant(100),
            &[],
            &mut one_voice(),
        );
        assert!(matches!(result, Err(MusicError::InvalidArgument(_))));
    }

    #[test]
    fn pitches_outside_midi_range_are_rejected() {
        let slice: Vec<Rational> = (0..=4).map(Rational::from_int).collect();
        let result = generate_motive(
            2,
            &slice,
            &mut Lin::new(0, 1),
            &mut Lin::constant(100),
            &mut Lin::constant(100),
            &[130],
            &mut one_voice(),
        );
        assert!(matches!(result, Err(MusicError::PitchOutOfRange(130))));
    }

    #[test]
    fn durations_sum_to_slice_span_for_random_inputs() {
        let mut master = SeededRng::new(2024);
        let ramifications: [&[u32]; 4] = [&[4, 2], &[3, 1, 2, 2, 6], &[7, 1, 2, 2, 6], &[5, 3]];
        for ramification in ramifications {
            let metrum = Metrum::new(ramification).unwrap();
            let depth = ramification.len() + 1;
            for lo in 0..=depth {
                let slice = metrum.lookup_weights(Some(lo), None);
                if slice.len() < 2 {
                    continue;
                }
                for _ in 0..20 {
                    let hits = master.range_u64(0, 40) as usize;
                    let mut beat =
                        Rnd::new(-50, Some(500), 1, RangePolicy::AsGiven, master.fork()).unwrap();
                    let mut dur = Rnd::between(0, 150, master.fork()).unwrap();
                    let mut vel = Rnd::between(20, 120, master.fork()).unwrap();
                    let mut voices: Vec<Box<dyn IntGenerator>> = vec![
                        Box::new(Walk::bounded(7, 0, 14, 2, master.fork())),
                        Box::new(Walk::bounded(5, 0, 14, 2, master.fork())),
                    ];
                    let pitches: Vec<i32> = (48..64).collect();
                    let chords = generate_motive(
                        hits, &slice, &mut beat, &mut dur, &mut vel, &pitches, &mut voices,
                    )
                    .unwrap();

                    assert_eq!(total(&chords), slice[slice.len() - 1] - slice[0]);
                    assert!(chords.iter().all(|c| c.duration().is_positive()));
                }
            }
        }
    }
}
