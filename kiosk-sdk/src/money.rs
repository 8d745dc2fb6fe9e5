//! Monetary amounts held in minor currency units.

use rust_decimal::Decimal;
use std::fmt;

/// An amount in minor currency units (pence, cents).
///
/// Displays with two decimal places, e.g. `Money(70)` renders as `0.70`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(pub u32);

impl Money {
    pub fn minor_units(self) -> u32 {
        self.0
    }

    /// Convert to a decimal in major units.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(i64::from(self.0), 2)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl From<u32> for Money {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
