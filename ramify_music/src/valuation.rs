// Valuations: how deeply an integer is divisible by a base.
//
// These are the deterministic, pseudo-periodic modulators behind the whole
// composer. The 2-valuation of the bar number decides how busy the drums
// get, the 3-valuation decides bar length, the dyadic valuation ranks the
// degrees of a harmony, and the mixed-radix ramification valuation assigns
// metrical strength to every subdivision of a metrum.
//
// Zero is divisible by everything. `dyadic_valuation` and `p_valuation`
// report it as `None`; `ramification_valuation` reports it as one level
// deeper than "divides cleanly at every level" so a bar's downbeat outranks
// everything else.

/// Exponent of the highest power of two dividing `x`, or `None` for zero.
pub fn dyadic_valuation(x: i64) -> Option<u32> {
    if x == 0 { None } else { Some(x.trailing_zeros()) }
}

/// Exponent of the highest power of `p` dividing `x`, or `None` for zero.
///
/// Panics if `p < 2`.
pub fn p_valuation(p: i64, x: i64) -> Option<u32> {
    assert!(p >= 2, "p_valuation: base must be at least 2, got {p}");
    if x == 0 {
        return None;
    }
    let mut x = x;
    let mut exponent = 0;
    while x % p == 0 {
        x /= p;
        exponent += 1;
    }
    Some(exponent)
}

/// Mixed-radix valuation of `x` against a ramification of length `L`.
///
/// Divides by the ramification entries from the last towards the second and
/// returns the number of exact divisions before the first remainder. The
/// first entry is never divided by: it only sets the number of top-level
/// beats. Returns `L` when every division was exact and `L + 1` for zero,
/// so the result always lies in `[0, L + 1]`.
///
/// Entries of zero or one never produce a remainder and so count as exact.
pub fn ramification_valuation(ramification: &[u32], x: i64) -> usize {
    let len = ramification.len();
    if x == 0 {
        return len + 1;
    }
    let mut x = x;
    for (depth, &radix) in ramification.iter().skip(1).rev().enumerate() {
        if radix == 0 {
            continue;
        }
        let radix = radix as i64;
        if x.rem_euclid(radix) != 0 {
            return depth;
        }
        x = x.div_euclid(radix);
    }
    len
}
