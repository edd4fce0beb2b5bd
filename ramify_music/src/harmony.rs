// Harmony: a weighted map over the twelve pitch classes.
//
// A harmony starts from a seven-tone scale and a base degree. Walking the
// seven degrees from the base, degree k gets weight `2 + v2(8 + k)`: the
// base itself scores 5, the fifth degree 4, the third and seventh 3, and the
// remaining degrees 2. Pitch classes outside the scale keep weight 1. This
// is a tonal hierarchy produced by a valuation rather than a lookup table.
//
// Parts pick their pitch material by weight: `lookup_weights(Some(4), None)`
// is "tonic and dominant only", `Some(2)..` is "the whole scale". The result
// is a `PeriodicPitchIndex` (see pitch_index.rs), which the part then narrows
// to a register with `lookup_range`.

use crate::error::{MusicError, Result};
use crate::pitch_index::PeriodicPitchIndex;
use crate::valuation::dyadic_valuation;
use serde::{Deserialize, Serialize};

pub const HARMONY_PERIOD: i32 = 12;

/// Weight of pitch classes that are not part of the scale.
const OUT_OF_SCALE_WEIGHT: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedPitch {
    pub pitch: i32,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Harmony {
    /// One entry per pitch class, in order 0..12.
    pitches: Vec<WeightedPitch>,
}

impl Harmony {
    /// Build the weight map for `septatonic` rooted at degree `base`.
    ///
    /// Only the first seven entries of `septatonic` are read, so the output
    /// of `build_scale` (which closes with the octave) can be passed as is.
    /// `base` may be any integer; it is taken modulo 7.
    pub fn new(septatonic: &[i32], base: i64) -> Result<Self> {
        if septatonic.len() < 7 {
            return Err(MusicError::invalid(format!(
                "harmony needs a seven-tone scale, got {} tones",
                septatonic.len()
            )));
        }
        let degrees = &septatonic[..7];
        if let Some(&bad) = degrees.iter().find(|&&p| !(0..HARMONY_PERIOD).contains(&p)) {
            return Err(MusicError::invalid(format!(
                "scale degree {bad} is outside [0, {HARMONY_PERIOD})"
            )));
        }

        let mut weights = [OUT_OF_SCALE_WEIGHT; HARMONY_PERIOD as usize];
        for k in 0..7i64 {
            let degree = (base + k).rem_euclid(7) as usize;
            // 8 + k is never zero, so the valuation is always defined.
            let depth = dyadic_valuation(8 + k).unwrap_or(0);
            weights[degrees[degree] as usize] = 2 + depth;
        }

        let pitches = weights
            .iter()
            .enumerate()
            .map(|(pc, &weight)| WeightedPitch {
                pitch: pc as i32,
                weight,
            })
            .collect();
        Ok(Harmony { pitches })
    }

    pub fn weighted_pitches(&self) -> &[WeightedPitch] {
        &self.pitches
    }

    pub fn period(&self) -> i32 {
        HARMONY_PERIOD
    }

    pub fn weight_of(&self, pitch_class: i32) -> u32 {
        self.pitches[pitch_class.rem_euclid(HARMONY_PERIOD) as usize].weight
    }

    /// Pitch classes whose weight lies in `[lo, hi]`, both ends inclusive
    /// and either end open when `None`.
    pub fn lookup_weights(&self, lo: Option<u32>, hi: Option<u32>) -> PeriodicPitchIndex {
        let classes: Vec<i32> = self
            .pitches
            .iter()
            .filter(|wp| lo.is_none_or(|lo| lo <= wp.weight))
            .filter(|wp| hi.is_none_or(|hi| wp.weight <= hi))
            .map(|wp| wp.pitch)
            .collect();
        // Entries are distinct pitch classes 0..12 in ascending order.
        PeriodicPitchIndex::from_sorted_classes(classes, HARMONY_PERIOD)
    }

    /// Pitch classes of exactly weight `w`.
    pub fn lookup_weight(&self, w: u32) -> PeriodicPitchIndex {
        self.lookup_weights(Some(w), Some(w))
    }
}
