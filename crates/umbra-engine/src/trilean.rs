//! Three-valued truth
//!
//! Comparisons and branch conditions over partially-known values cannot always
//! be decided. `Trilean` carries the third outcome explicitly so callers are
//! forced to handle it instead of collapsing it into a boolean.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Not;

/// A truth value that may be undecidable from the known bits of its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trilean {
    /// The condition definitely holds.
    True,
    /// The condition definitely does not hold.
    False,
    /// The known bits of the inputs do not decide the condition.
    Unknown,
}

impl Trilean {
    /// Returns `true` only for a definite [`Trilean::True`].
    #[must_use]
    pub fn is_true(self) -> bool {
        matches!(self, Trilean::True)
    }

    /// Returns `true` only for a definite [`Trilean::False`].
    #[must_use]
    pub fn is_false(self) -> bool {
        matches!(self, Trilean::False)
    }

    /// Returns `true` if the condition could not be decided.
    #[must_use]
    pub fn is_unknown(self) -> bool {
        matches!(self, Trilean::Unknown)
    }

    /// Collapses to `Some(bool)` for definite values, `None` for unknown.
    #[must_use]
    pub fn to_bool(self) -> Option<bool> {
        match self {
            Trilean::True => Some(true),
            Trilean::False => Some(false),
            Trilean::Unknown => None,
        }
    }

    /// Kleene conjunction: a definite `False` on either side wins.
    #[must_use]
    pub fn and(self, other: Trilean) -> Trilean {
        match (self, other) {
            (Trilean::False, _) | (_, Trilean::False) => Trilean::False,
            (Trilean::True, Trilean::True) => Trilean::True,
            _ => Trilean::Unknown,
        }
    }

    /// Kleene disjunction: a definite `True` on either side wins.
    #[must_use]
    pub fn or(self, other: Trilean) -> Trilean {
        match (self, other) {
            (Trilean::True, _) | (_, Trilean::True) => Trilean::True,
            (Trilean::False, Trilean::False) => Trilean::False,
            _ => Trilean::Unknown,
        }
    }

    /// Exclusive or; unknown on either side makes the result unknown.
    #[must_use]
    pub fn xor(self, other: Trilean) -> Trilean {
        match (self.to_bool(), other.to_bool()) {
            (Some(a), Some(b)) => Trilean::from(a != b),
            _ => Trilean::Unknown,
        }
    }
}

impl Not for Trilean {
    type Output = Trilean;

    fn not(self) -> Trilean {
        match self {
            Trilean::True => Trilean::False,
            Trilean::False => Trilean::True,
            Trilean::Unknown => Trilean::Unknown,
        }
    }
}

impl From<bool> for Trilean {
    fn from(value: bool) -> Self {
        if value {
            Trilean::True
        } else {
            Trilean::False
        }
    }
}

impl From<Option<bool>> for Trilean {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(b) => Trilean::from(b),
            None => Trilean::Unknown,
        }
    }
}

impl fmt::Display for Trilean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trilean::True => write!(f, "true"),
            Trilean::False => write!(f, "false"),
            Trilean::Unknown => write!(f, "unknown"),
        }
    }
}
