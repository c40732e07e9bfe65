//! Concrete floating-point values
//!
//! Floats carry no unknown-bit tracking; a synthesized unknown float is a
//! known zero. Arithmetic and comparison are plain IEEE 754 on f64.

use std::cmp::Ordering;
use std::fmt;

/// A concrete f64. Narrower float fields round-trip through [`FloatValue::to_f32`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatValue(pub f64);

impl FloatValue {
    pub fn new(value: f64) -> Self {
        FloatValue(value)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    pub fn add(self, rhs: FloatValue) -> FloatValue {
        FloatValue(self.0 + rhs.0)
    }

    pub fn sub(self, rhs: FloatValue) -> FloatValue {
        FloatValue(self.0 - rhs.0)
    }

    pub fn mul(self, rhs: FloatValue) -> FloatValue {
        FloatValue(self.0 * rhs.0)
    }

    /// IEEE division; a zero divisor yields an infinity or NaN, never a fault.
    pub fn div(self, rhs: FloatValue) -> FloatValue {
        FloatValue(self.0 / rhs.0)
    }

    /// Remainder with the sign of the dividend.
    pub fn rem(self, rhs: FloatValue) -> FloatValue {
        FloatValue(self.0 % rhs.0)
    }

    pub fn neg(self) -> FloatValue {
        FloatValue(-self.0)
    }

    /// IEEE ordering; `None` when either side is NaN.
    #[must_use]
    pub fn compare(self, rhs: FloatValue) -> Option<Ordering> {
        self.0.partial_cmp(&rhs.0)
    }

    /// Truthiness. NaN is nonzero.
    #[must_use]
    pub fn is_nonzero(self) -> bool {
        self.0 != 0.0
    }

    /// Round through f32 precision, for narrow float storage.
    pub fn to_f32(self) -> FloatValue {
        FloatValue(self.0 as f32 as f64)
    }
}

impl From<f64> for FloatValue {
    fn from(value: f64) -> Self {
        FloatValue(value)
    }
}

impl fmt::Display for FloatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Show integral values without a decimal point
        if self.0.fract() == 0.0 && self.0.is_finite() {
            write!(f, "{:.0}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
