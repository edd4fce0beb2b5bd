// Metrum: a hierarchical metrical grid.
//
// A ramification such as [4, 2] reads "four beats, each split in two". The
// metrum lays out all N + 1 subdivision points of one bar (N being the
// product of the ramification) at times `i * ramification[0] / N`, so time is
// measured in top-level beats and the bar closes at `ramification[0]`.
//
// Each point carries its ramification valuation as a metrical weight: the
// bar boundaries are strongest, then points that divide evenly at every
// level, down to weight 0 for the finest off-beats. Parts take a weight
// slice (`lookup_weights(Some(2), None)` for "quarters and stronger") and
// hand the resulting time list to the motive generator (see motive.rs).

use crate::error::{MusicError, Result};
use crate::rational::Rational;
use crate::valuation::ramification_valuation;
use serde::{Deserialize, Serialize};

/// Upper bound on grid points per bar.
const MAX_SUBDIVISIONS: i64 = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedBeat {
    pub time: Rational,
    pub weight: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrum {
    ramification: Vec<u32>,
    beats: Vec<WeightedBeat>,
}

impl Metrum {
    /// Lay out the grid for a ramification of positive entries.
    pub fn new(ramification: &[u32]) -> Result<Self> {
        if ramification.is_empty() {
            return Err(MusicError::invalid("ramification must not be empty"));
        }
        if ramification.contains(&0) {
            return Err(MusicError::invalid(format!(
                "ramification entries must be positive: {ramification:?}"
            )));
        }
        let subdivisions = ramification
            .iter()
            .try_fold(1i64, |acc, &r| acc.checked_mul(r as i64))
            .filter(|&n| n <= MAX_SUBDIVISIONS)
            .ok_or_else(|| {
                MusicError::invalid(format!("ramification {ramification:?} subdivides too finely"))
            })?;

        let span = ramification[0] as i64;
        let beats = (0..=subdivisions)
            .map(|i| WeightedBeat {
                time: Rational::new(i * span, subdivisions),
                weight: ramification_valuation(ramification, i),
            })
            .collect();

        Ok(Metrum {
            ramification: ramification.to_vec(),
            beats,
        })
    }

    pub fn ramification(&self) -> &[u32] {
        &self.ramification
    }

    pub fn beats(&self) -> &[WeightedBeat] {
        &self.beats
    }

    /// Length of the bar in top-level beats.
    pub fn span(&self) -> Rational {
        Rational::from_int(self.ramification[0] as i64)
    }

    /// Times of the beats whose weight lies in `[lo, hi]`, both ends
    /// inclusive and either end open when `None`.
    pub fn lookup_weights(&self, lo: Option<usize>, hi: Option<usize>) -> Vec<Rational> {
        self.beats
            .iter()
            .filter(|b| lo.is_none_or(|lo| lo <= b.weight))
            .filter(|b| hi.is_none_or(|hi| b.weight <= hi))
            .map(|b| b.time)
            .collect()
    }

    /// Times of the beats of exactly weight `w`.
    pub fn lookup_weight(&self, w: usize) -> Vec<Rational> {
        self.lookup_weights(Some(w), Some(w))
    }
}
