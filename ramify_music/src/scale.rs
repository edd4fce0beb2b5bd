// Scale builder: step-pattern strings to ascending pitch-class lists.
//
// A scale is written the way musicians count it, as the semitone steps
// between consecutive degrees: "2212221" is the major scale. The builder
// accumulates the steps from 0, so a seven-step pattern gives eight values
// whose last one is the period (12 for a well-formed octave pattern).

use crate::error::{MusicError, Result};

pub const MAJOR: &str = "2212221";
pub const ARABIC: &str = "1312131";
pub const HARMONIC_MINOR: &str = "2122131";

/// Accumulate a step pattern into an ascending scale starting at 0.
///
/// Steps are read cyclically starting at index `shift`, which rotates the
/// pattern into one of its modes. Exactly `steps.len()` values are appended
/// after the leading 0. The final sum is not checked against any period.
pub fn build_scale(steps: &str, shift: usize) -> Result<Vec<i32>> {
    let digits = steps
        .chars()
        .map(|c| {
            c.to_digit(10)
                .map(|d| d as i32)
                .ok_or_else(|| MusicError::invalid(format!("scale step {c:?} is not a digit")))
        })
        .collect::<Result<Vec<i32>>>()?;

    let mut keys = Vec::with_capacity(digits.len() + 1);
    keys.push(0);
    for i in 0..digits.len() {
        let last = keys[keys.len() - 1];
        keys.push(last + digits[(shift + i) % digits.len()]);
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn major_scale() {
        assert_eq!(build_scale(MAJOR, 0).unwrap(), vec![0, 2, 4, 5, 7, 9, 11, 12]);
    }

    #[test]
    fn shift_rotates_into_a_mode() {
        // Starting on the second step of major gives dorian.
        assert_eq!(build_scale(MAJOR, 1).unwrap(), vec![0, 2, 3, 5, 7, 9, 10, 12]);
        // A shift past the end wraps around.
        assert_eq!(build_scale(MAJOR, 8).unwrap(), build_scale(MAJOR, 1).unwrap());
    }

    #[test]
    fn presets_span_one_octave() {
        for steps in [MAJOR, ARABIC, HARMONIC_MINOR] {
            for shift in 0..7 {
                let scale = build_scale(steps, shift).unwrap();
                assert_eq!(scale.len(), 8);
                assert_eq!(scale[7], 12, "{steps} shifted by {shift}");
                assert!(scale.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn sum_is_not_enforced() {
        assert_eq!(build_scale("33", 0).unwrap(), vec![0, 3, 6]);
    }

    #[test]
    fn empty_pattern_is_just_the_root() {
        assert_eq!(build_scale("", 3).unwrap(), vec![0]);
    }

    #[test]
    fn rejects_non_digits() {
        assert!(matches!(
            build_scale("22x2", 0),
            Err(MusicError::InvalidArgument(_))
        ));
    }
}
