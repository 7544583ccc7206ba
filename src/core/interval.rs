//! core/interval.rs — closed intervals `[lo, hi]` over `f64`.
//!
//! Used for centre/radius bounds and as the interval-arithmetic backend of the
//! simulator. Operations round to nearest; they track ranges, they do not
//! certify them.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

impl Interval {
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    pub fn point(x: f64) -> Self {
        Self { lo: x, hi: x }
    }

    pub fn from_centre_radius(centre: f64, radius: f64) -> Self {
        let r = radius.abs();
        Self {
            lo: centre - r,
            hi: centre + r,
        }
    }

    pub fn nan() -> Self {
        Self {
            lo: f64::NAN,
            hi: f64::NAN,
        }
    }

    pub fn is_nan(&self) -> bool {
        self.lo.is_nan() || self.hi.is_nan()
    }

    pub fn centre(&self) -> f64 {
        0.5 * (self.lo + self.hi)
    }

    pub fn radius(&self) -> f64 {
        0.5 * (self.hi - self.lo)
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn contains(&self, x: f64) -> bool {
        self.lo <= x && x <= self.hi
    }

    pub fn contains_interval(&self, other: &Interval) -> bool {
        self.lo <= other.lo && other.hi <= self.hi
    }

    pub fn has_zero(&self) -> bool {
        self.contains(0.0)
    }

    /// Smallest interval containing both.
    pub fn hull(&self, other: &Interval) -> Interval {
        Interval {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }

    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let lo = self.lo.max(other.lo);
        let hi = self.hi.min(other.hi);
        (lo <= hi).then_some(Interval { lo, hi })
    }

    pub fn add(&self, other: &Interval) -> Interval {
        Interval {
            lo: self.lo + other.lo,
            hi: self.hi + other.hi,
        }
    }

    pub fn sub(&self, other: &Interval) -> Interval {
        Interval {
            lo: self.lo - other.hi,
            hi: self.hi - other.lo,
        }
    }

    pub fn neg(&self) -> Interval {
        Interval {
            lo: -self.hi,
            hi: -self.lo,
        }
    }

    pub fn scale(&self, k: f64) -> Interval {
        Interval::new(self.lo * k, self.hi * k)
    }

    pub fn mul(&self, other: &Interval) -> Interval {
        let p = [
            self.lo * other.lo,
            self.lo * other.hi,
            self.hi * other.lo,
            self.hi * other.hi,
        ];
        if p.iter().any(|v| v.is_nan()) {
            return Interval::nan();
        }
        let lo = p.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = p.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Interval { lo, hi }
    }

    /// `1 / x`. An interval containing zero maps to `[-inf, inf]`.
    pub fn inv(&self) -> Interval {
        if self.is_nan() {
            return Interval::nan();
        }
        if self.has_zero() {
            return Interval {
                lo: f64::NEG_INFINITY,
                hi: f64::INFINITY,
            };
        }
        Interval::new(1.0 / self.hi, 1.0 / self.lo)
    }

    pub fn div(&self, other: &Interval) -> Interval {
        self.mul(&other.inv())
    }

    pub fn exp(&self) -> Interval {
        Interval {
            lo: self.lo.exp(),
            hi: self.hi.exp(),
        }
    }

    /// Square root; any negative part of the domain gives NaN.
    pub fn sqrt(&self) -> Interval {
        if self.is_nan() || self.lo < 0.0 {
            return Interval::nan();
        }
        Interval {
            lo: self.lo.sqrt(),
            hi: self.hi.sqrt(),
        }
    }

    /// Natural log; a negative part gives NaN, a zero lower bound `-inf`.
    pub fn ln(&self) -> Interval {
        if self.is_nan() || self.lo < 0.0 {
            return Interval::nan();
        }
        Interval {
            lo: self.lo.ln(),
            hi: self.hi.ln(),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}
