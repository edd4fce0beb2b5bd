// Seedable random streams for algorithmic composition.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding,
// with no external dependencies so the same seed yields the same piece on
// every platform.
//
// Every random generator primitive in `ramify_music` (`Rnd`, `Walk`) owns its
// own `SeededRng`, passed in explicitly at construction. There is no
// process-wide default stream: an orchestrator that wants many generators
// holds one master stream and hands each generator a `fork()` of it.
//
// **Critical constraint: determinism.** Every method here must produce
// identical output given the same prior state, regardless of platform or
// optimization level. No floating point in the core generator.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ stream owned by exactly one consumer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRng {
    s: [u64; 4],
}

impl SeededRng {
    /// Create a stream from a `u64` seed.
    ///
    /// SplitMix64 expands the seed into the 256-bit state, so nearby seeds
    /// still give unrelated streams.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Derive an independent child stream, advancing this one by one step.
    ///
    /// Forking in a fixed order makes every child reproducible from the
    /// parent's seed alone.
    pub fn fork(&mut self) -> SeededRng {
        SeededRng::new(self.next_u64())
    }

    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform integer in `[low, high)`, rejection-sampled to avoid modulo bias.
    ///
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Uniform signed integer in `[low, high]`.
    ///
    /// Panics if `low > high`.
    pub fn range_i64_inclusive(&mut self, low: i64, high: i64) -> i64 {
        assert!(low <= high, "range_i64_inclusive: low must be <= high");
        let width = high as i128 - low as i128 + 1;
        if width > u64::MAX as i128 {
            // Full i64 domain.
            return self.next_u64() as i64;
        }
        (low as i128 + self.range_u64(0, width as u64) as i128) as i64
    }

    /// Fair coin.
    pub fn coin_flip(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }
}

/// SplitMix64, used only to expand a seed into xoshiro state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
