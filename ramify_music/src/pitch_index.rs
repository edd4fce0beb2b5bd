// Periodic pitch addressing.
//
// A `PeriodicPitchIndex` is a set of pitch classes repeated every `period`
// semitones across the whole keyboard. Instrument parts ask it for "every
// pitch of this harmony between 48 and 84" and get back concrete MIDI keys,
// lifted into the right octaves.
//
// Built from a scale (see scale.rs) or from a weight slice of a Harmony
// (see harmony.rs). Immutable after construction.

use crate::error::{MusicError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicPitchIndex {
    /// Strictly increasing pitch classes, all in `[0, period)`.
    scale: Vec<i32>,
    period: i32,
}

impl PeriodicPitchIndex {
    /// Validate and wrap a pitch-class list.
    ///
    /// The period must be positive and the scale strictly increasing within
    /// `[0, period)`. An empty scale is allowed: it is what a harmony slice
    /// that matches no weight produces.
    pub fn new(scale: Vec<i32>, period: i32) -> Result<Self> {
        if period <= 0 {
            return Err(MusicError::invalid(format!(
                "pitch index period must be positive, got {period}"
            )));
        }
        if let Some(&bad) = scale.iter().find(|&&p| !(0..period).contains(&p)) {
            return Err(MusicError::invalid(format!(
                "pitch class {bad} is outside [0, {period})"
            )));
        }
        if scale.windows(2).any(|w| w[0] >= w[1]) {
            return Err(MusicError::invalid(format!(
                "pitch classes must be strictly increasing: {scale:?}"
            )));
        }
        Ok(PeriodicPitchIndex { scale, period })
    }

    /// Wrap a scale from `build_scale`, dropping the closing value that
    /// equals the period (the octave repeat of 0).
    pub fn from_scale(scale: &[i32], period: i32) -> Result<Self> {
        let classes = scale.iter().copied().filter(|&p| p != period).collect();
        PeriodicPitchIndex::new(classes, period)
    }

    /// Skip validation for callers that already hold distinct, ascending
    /// classes within the period.
    pub(crate) fn from_sorted_classes(scale: Vec<i32>, period: i32) -> Self {
        debug_assert!(scale.windows(2).all(|w| w[0] < w[1]));
        PeriodicPitchIndex { scale, period }
    }

    pub fn pitch_classes(&self) -> &[i32] {
        &self.scale
    }

    pub fn period(&self) -> i32 {
        self.period
    }

    /// Number of pitch classes per period.
    pub fn len(&self) -> usize {
        self.scale.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scale.is_empty()
    }

    /// The degenerate range `[n, n]`: every member of the period that
    /// contains `n`, lifted into that period and ascending.
    pub fn lookup_at(&self, n: i32) -> Vec<i32> {
        let octave = n.div_euclid(self.period);
        self.scale
            .iter()
            .map(|&pc| octave * self.period + pc)
            .collect()
    }

    /// Every member pitch in the half-open range `[start, stop)`, ascending.
    ///
    /// Empty when `start >= stop` or when nothing in the range belongs to
    /// the index.
    pub fn lookup_range(&self, start: i32, stop: i32) -> Vec<i32> {
        if start >= stop {
            return Vec::new();
        }
        let (low, offset) = (start.div_euclid(self.period), start.rem_euclid(self.period));
        let (up, end) = (stop.div_euclid(self.period), stop.rem_euclid(self.period));
        let lift = |octave: i32, pc: i32| octave * self.period + pc;

        if low == up {
            return self
                .scale
                .iter()
                .filter(|&&pc| offset <= pc && pc < end)
                .map(|&pc| lift(low, pc))
                .collect();
        }

        let mut pitches: Vec<i32> = self
            .scale
            .iter()
            .filter(|&&pc| pc >= offset)
            .map(|&pc| lift(low, pc))
            .collect();
        for octave in low + 1..up {
            pitches.extend(self.scale.iter().map(|&pc| lift(octave, pc)));
        }
        pitches.extend(
            self.scale
                .iter()
                .take_while(|&&pc| pc < end)
                .map(|&pc| lift(up, pc)),
        );
        pitches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::{MAJOR, build_scale};

    fn major() -> PeriodicPitchIndex {
        PeriodicPitchIndex::from_scale(&build_scale(MAJOR, 0).unwrap(), 12).unwrap()
    }

    #[test]
    fn one_period_returns_the_scale() {
        let index = major();
        assert_eq!(index.lookup_range(0, 12), vec![0, 2, 4, 5, 7, 9, 11]);
        assert_eq!(index.lookup_range(12, 24), vec![12, 14, 16, 17, 19, 21, 23]);
    }

    #[test]
    fn range_spanning_octaves() {
        let index = PeriodicPitchIndex::new(vec![0, 4, 7], 12).unwrap();
        assert_eq!(index.lookup_range(5, 30), vec![7, 12, 16, 19, 24, 28]);
        assert_eq!(index.lookup_range(24, 36), vec![24, 28, 31]);
    }

    #[test]
    fn range_within_one_octave() {
        let index = PeriodicPitchIndex::new(vec![0, 4, 7], 12).unwrap();
        assert_eq!(index.lookup_range(50, 56), vec![52, 55]);
        assert_eq!(index.lookup_range(53, 55), Vec::<i32>::new());
    }

    #[test]
    fn negative_ranges_lift_correctly() {
        let index = PeriodicPitchIndex::new(vec![0, 7], 12).unwrap();
        assert_eq!(index.lookup_range(-12, 1), vec![-12, -5, 0]);
    }

    #[test]
    fn empty_and_inverted_ranges() {
        let index = major();
        assert!(index.lookup_range(7, 7).is_empty());
        assert!(index.lookup_range(20, 10).is_empty());
        let nothing = PeriodicPitchIndex::new(Vec::new(), 12).unwrap();
        assert!(nothing.lookup_range(0, 128).is_empty());
    }

    #[test]
    fn lookup_at_returns_the_enclosing_period() {
        let triad = PeriodicPitchIndex::new(vec![0, 4, 7], 12).unwrap();
        assert_eq!(triad.lookup_at(5), vec![0, 4, 7]);
        assert_eq!(triad.lookup_at(0), vec![0, 4, 7]);
        assert_eq!(triad.lookup_at(61), vec![60, 64, 67]);
        assert_eq!(triad.lookup_at(-1), vec![-12, -8, -5]);
        assert_eq!(major().lookup_at(13), major().lookup_range(12, 24));
        assert!(PeriodicPitchIndex::new(Vec::new(), 12).unwrap().lookup_at(3).is_empty());
    }

    #[test]
    fn identical_inputs_give_identical_results() {
        let a = major();
        let b = major();
        for (start, stop) in [(0, 12), (24, 60), (50, 64), (-7, 3)] {
            assert_eq!(a.lookup_range(start, stop), b.lookup_range(start, stop));
        }
    }

    #[test]
    fn rejects_invalid_scales() {
        assert!(PeriodicPitchIndex::new(vec![0, 2], 0).is_err());
        assert!(PeriodicPitchIndex::new(vec![0, 12], 12).is_err());
        assert!(PeriodicPitchIndex::new(vec![0, 4, 4], 12).is_err());
        assert!(PeriodicPitchIndex::new(vec![5, 2], 12).is_err());
        assert!(PeriodicPitchIndex::new(vec![-1, 2], 12).is_err());
    }
}
