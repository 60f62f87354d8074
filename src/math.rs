//! Exact rational arithmetic for exercise solutions and expression values
//!
//! Solutions of the flexibility systems and values produced by the
//! free-text expression evaluator are compared for exact equality, so they
//! are represented as reduced fractions rather than floats.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// A rational number, always stored reduced with a positive denominator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fraction {
    num: i64,
    den: i64,
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a.max(1)
}

impl Fraction {
    pub const ZERO: Fraction = Fraction { num: 0, den: 1 };
    pub const ONE: Fraction = Fraction { num: 1, den: 1 };

    /// Create a reduced fraction. Returns `None` for a zero denominator.
    pub fn new(num: i64, den: i64) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let sign = if den < 0 { -1 } else { 1 };
        let g = gcd(num, den);
        Some(Self {
            num: sign * num / g,
            den: (den / g).abs(),
        })
    }

    pub fn from_integer(n: i64) -> Self {
        Self { num: n, den: 1 }
    }

    pub fn numerator(&self) -> i64 {
        self.num
    }

    pub fn denominator(&self) -> i64 {
        self.den
    }

    pub fn is_integer(&self) -> bool {
        self.den == 1
    }

    /// The integer value, if the fraction is whole
    pub fn as_integer(&self) -> Option<i64> {
        self.is_integer().then_some(self.num)
    }

    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Division; `None` when `rhs` is zero
    pub fn checked_div(self, rhs: Fraction) -> Option<Fraction> {
        if rhs.is_zero() {
            return None;
        }
        Fraction::new(self.num * rhs.den, self.den * rhs.num)
    }

    /// Multiplicative inverse; `None` for zero
    pub fn recip(self) -> Option<Fraction> {
        Fraction::ONE.checked_div(self)
    }
}

impl From<i64> for Fraction {
    fn from(n: i64) -> Self {
        Fraction::from_integer(n)
    }
}

impl Add for Fraction {
    type Output = Fraction;

    fn add(self, rhs: Fraction) -> Fraction {
        // Denominators are nonzero by construction, so the product is too.
        Fraction::new(self.num * rhs.den + rhs.num * self.den, self.den * rhs.den)
            .unwrap_or(Fraction::ZERO)
    }
}

impl Sub for Fraction {
    type Output = Fraction;

    fn sub(self, rhs: Fraction) -> Fraction {
        self + (-rhs)
    }
}

impl Mul for Fraction {
    type Output = Fraction;

    fn mul(self, rhs: Fraction) -> Fraction {
        Fraction::new(self.num * rhs.num, self.den * rhs.den).unwrap_or(Fraction::ZERO)
    }
}

impl Neg for Fraction {
    type Output = Fraction;

    fn neg(self) -> Fraction {
        Fraction {
            num: -self.num,
            den: self.den,
        }
    }
}

impl std::fmt::Display for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}
