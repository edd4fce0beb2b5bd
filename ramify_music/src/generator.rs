// Integer value generators that parametrize a motive.
//
// The motive generator (motive.rs) asks four kinds of question over and
// over: where is the next attack, how long does it ring, how loud is it,
// and which pitch does each voice take. Each question is answered by an
// `IntGenerator`, a stateful source of integers. Three concrete kinds
// cover every part in the arrangement:
//
// - `Lin`: arithmetic progression, for evenly spread beats and fixed values.
// - `Rnd`: independent uniform draws from an arithmetic progression.
// - `Walk`: a clamped random walk, for melodic contour.
//
// Random kinds own their `SeededRng`; nothing draws from a shared stream,
// so a generator seeded the same way always answers the same way.

use crate::error::{MusicError, Result};
use ramify_prng::SeededRng;
use serde::{Deserialize, Serialize};

/// A nullary, stateful source of integers.
pub trait IntGenerator {
    fn next(&mut self) -> i64;
}

impl<F: FnMut() -> i64> IntGenerator for F {
    fn next(&mut self) -> i64 {
        self()
    }
}

/// What to do with bounds given as `high < low`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Keep the bounds as written. An `Rnd` over an inverted range is empty
    /// and fails to construct; a `Walk` clamps against both bounds in order.
    #[default]
    AsGiven,
    /// Swap inverted bounds before use.
    SwapInverted,
}

impl RangePolicy {
    fn order(self, low: i64, high: Option<i64>) -> (i64, Option<i64>) {
        match (self, high) {
            (RangePolicy::SwapInverted, Some(high)) if high < low => (high, Some(low)),
            _ => (low, high),
        }
    }
}

/// Arithmetic progression: `value`, `value + step`, `value + 2 * step`, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lin {
    /// Last value returned; starts one step before the first.
    value: i64,
    step: i64,
}

impl Lin {
    pub fn new(value: i64, step: i64) -> Self {
        Lin {
            value: value - step,
            step,
        }
    }

    /// A generator that always returns `value`.
    pub fn constant(value: i64) -> Self {
        Lin::new(value, 0)
    }
}

impl IntGenerator for Lin {
    fn next(&mut self) -> i64 {
        self.value += self.step;
        self.value
    }
}

/// Uniform draws from `low, low + step, ...` stopping before `high`.
///
/// Without `high` the draws come from `0, step, ...` stopping before `low`.
/// A negative step counts downwards from `low` towards `high`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rnd {
    start: i64,
    step: i64,
    /// Number of values in the progression, always positive.
    count: u64,
    rng: SeededRng,
}

impl Rnd {
    pub fn new(
        low: i64,
        high: Option<i64>,
        step: i64,
        policy: RangePolicy,
        rng: SeededRng,
    ) -> Result<Self> {
        if step == 0 {
            return Err(MusicError::invalid("random generator step must not be zero"));
        }
        let (low, high) = policy.order(low, high);
        let (start, stop) = match high {
            Some(high) => (low, high),
            None => (0, low),
        };
        let width = stop as i128 - start as i128;
        let step_wide = step as i128;
        let count = if step > 0 {
            (width + step_wide - 1).div_euclid(step_wide)
        } else {
            (width + step_wide + 1).div_euclid(step_wide)
        };
        if count <= 0 || count > u64::MAX as i128 {
            return Err(MusicError::invalid(format!(
                "empty random range from {start} to {stop} by {step}"
            )));
        }
        Ok(Rnd {
            start,
            step,
            count: count as u64,
            rng,
        })
    }

    /// Unit-step draws from `[low, high)`, bounds kept as given.
    pub fn between(low: i64, high: i64, rng: SeededRng) -> Result<Self> {
        Rnd::new(low, Some(high), 1, RangePolicy::AsGiven, rng)
    }
}

impl IntGenerator for Rnd {
    fn next(&mut self) -> i64 {
        let k = self.rng.range_u64(0, self.count) as i128;
        (self.start as i128 + k * self.step as i128) as i64
    }
}

/// Random walk: each call moves `±step` with equal odds, then clamps to at
/// most `high` and at least `low - 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Walk {
    value: i64,
    low: i64,
    high: Option<i64>,
    step: i64,
    rng: SeededRng,
}

impl Walk {
    pub fn new(
        value: i64,
        low: i64,
        high: Option<i64>,
        step: i64,
        policy: RangePolicy,
        rng: SeededRng,
    ) -> Self {
        let (low, high) = policy.order(low, high);
        Walk {
            value,
            low,
            high,
            step,
            rng,
        }
    }

    /// Walk within `[low - 1, high]`, bounds kept as given.
    pub fn bounded(value: i64, low: i64, high: i64, step: i64, rng: SeededRng) -> Self {
        Walk::new(value, low, Some(high), step, RangePolicy::AsGiven, rng)
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

impl IntGenerator for Walk {
    fn next(&mut self) -> i64 {
        let delta = if self.rng.coin_flip() { self.step } else { -self.step };
        self.value = self.value.saturating_add(delta);
        if let Some(high) = self.high {
            self.value = self.value.min(high);
        }
        // The floor sits one below `low`.
        self.value = self.value.max(self.low.saturating_sub(1));
        self.value
    }
}
