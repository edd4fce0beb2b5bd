// Exact rational numbers for metrum times and chord durations.
//
// A metrum subdivides a bar into `N` equal steps, so its time points are
// fractions like 5/24. Keeping them exact means the durations a motive emits
// telescope back to the slice span with no floating-point drift, and two
// time points compare equal exactly when they are the same grid position.
//
// Values are always stored fully reduced with a positive denominator, so the
// derived `PartialEq`/`Hash` are structural equality.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops;

type Int = i64;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    num: Int,
    den: Int,
}

impl Rational {
    /// Build a reduced fraction.
    ///
    /// Panics if `den` is zero.
    pub fn new(num: Int, den: Int) -> Rational {
        assert_ne!(den, 0, "Rational denominator must not be zero");
        let sign = if den < 0 { -1 } else { 1 };
        let div = gcd(num, den).max(1);
        Rational {
            num: sign * num / div,
            den: sign * den / div,
        }
    }

    pub const fn from_int(int: Int) -> Rational {
        Rational { num: int, den: 1 }
    }

    pub const fn zero() -> Rational {
        Rational::from_int(0)
    }

    pub fn numerator(self) -> Int {
        self.num
    }

    pub fn denominator(self) -> Int {
        self.den
    }

    pub fn is_zero(self) -> bool {
        self.num == 0
    }

    pub fn is_positive(self) -> bool {
        self.num > 0
    }

    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Scale by an integer factor and round to the nearest integer, ties
    /// away from zero. Used to turn quarter-note times into MIDI ticks.
    pub fn scaled_round(self, factor: Int) -> Int {
        let scaled = self.num as i128 * factor as i128;
        let den = self.den as i128;
        let half = den / 2;
        let rounded = if scaled >= 0 {
            (scaled + half) / den
        } else {
            (scaled - half) / den
        };
        rounded as Int
    }
}

impl Default for Rational {
    fn default() -> Self {
        Rational::zero()
    }
}

impl From<Int> for Rational {
    fn from(n: Int) -> Self {
        Rational::from_int(n)
    }
}

impl ops::Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Rational {
        Rational::new(self.num * rhs.den + rhs.num * self.den, self.den * rhs.den)
    }
}

impl ops::AddAssign for Rational {
    fn add_assign(&mut self, rhs: Rational) {
        *self = *self + rhs;
    }
}

impl ops::Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Rational {
        self + (-rhs)
    }
}

impl ops::Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            num: -self.num,
            den: self.den,
        }
    }
}

impl ops::Mul<Int> for Rational {
    type Output = Rational;

    fn mul(self, rhs: Int) -> Rational {
        Rational::new(self.num * rhs, self.den)
    }
}

impl ops::Div<Int> for Rational {
    type Output = Rational;

    fn div(self, rhs: Int) -> Rational {
        Rational::new(self.num, self.den * rhs)
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Rational) -> Ordering {
        (self.num as i128 * other.den as i128).cmp(&(other.num as i128 * self.den as i128))
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Rational) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Sum for Rational {
    fn sum<I: Iterator<Item = Rational>>(iter: I) -> Rational {
        iter.fold(Rational::zero(), |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Rational> for Rational {
    fn sum<I: Iterator<Item = &'a Rational>>(iter: I) -> Rational {
        iter.copied().sum()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

fn gcd(a: Int, b: Int) -> Int {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
