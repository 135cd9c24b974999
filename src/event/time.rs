//! Musical time as exact rational units.
//!
//! One unit is the length of a plain swara at speed level 0. Karve marks add
//! whole units, groups divide by 2 or 3/2, speed levels divide by powers of two,
//! so every position on the timeline is a ratio of small integers. Time is
//! never stored as a float; conversion to MIDI ticks happens only at the
//! encoder boundary, from absolute positions.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use num_rational::Ratio;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, ToPrimitive, Zero};

/// Units per quarter note. A quarter-beat tick is exactly one unit.
pub const UNITS_PER_QUARTER: u64 = 4;

/// A position or length on the timeline, in units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(Ratio<u64>);

impl Time {
    /// The very start of the timeline.
    pub const ZERO: Time = Time(Ratio::new_raw(0, 1));

    /// One unit, the length of a plain swara.
    pub const UNIT: Time = Time(Ratio::new_raw(1, 1));

    /// Create a `Time` from whole units.
    pub fn from_units(units: u64) -> Self {
        Self(Ratio::from_integer(units))
    }

    /// Create a `Time` from an exact ratio of units. Reduced to lowest terms.
    ///
    /// Panics if `denom` is zero.
    pub fn from_fraction(numer: u64, denom: u64) -> Self {
        Self(Ratio::new(numer, denom))
    }

    pub fn ratio(self) -> Ratio<u64> {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Whole units elapsed, rounding down.
    pub fn floor_units(self) -> u64 {
        self.0.to_integer()
    }

    /// The first whole unit at or after this position.
    pub fn ceil_units(self) -> u64 {
        let (numer, denom) = (*self.0.numer(), *self.0.denom());
        numer / denom + u64::from(numer % denom != 0)
    }

    /// Length in quarter notes as a float. For display and assertions only.
    pub fn as_quarters_f64(self) -> f64 {
        self.0.to_f64().unwrap_or(f64::MAX) / UNITS_PER_QUARTER as f64
    }

    /// Convert to MIDI ticks at `ticks_per_quarter` resolution, rounding to the
    /// nearest tick. `None` if the tick count does not fit in a `u64`.
    pub fn to_ticks(self, ticks_per_quarter: u64) -> Option<u64> {
        let quarters = self
            .0
            .checked_div(&Ratio::from_integer(UNITS_PER_QUARTER))?;
        let ticks = quarters.checked_mul(&Ratio::from_integer(ticks_per_quarter))?;
        let (numer, denom) = (*ticks.numer(), *ticks.denom());
        let rem = numer % denom;
        // Halves round up.
        (numer / denom).checked_add(u64::from(rem >= denom - rem))
    }

    /// `self + rhs`, or `None` on overflow.
    pub fn checked_add(self, rhs: Time) -> Option<Time> {
        self.0.checked_add(&rhs.0).map(Time)
    }

    /// `self * factor`, or `None` on overflow.
    pub fn checked_mul(self, factor: Ratio<u64>) -> Option<Time> {
        self.0.checked_mul(&factor).map(Time)
    }

    /// `self / divisor`, or `None` on overflow or a zero divisor.
    pub fn checked_div(self, divisor: Ratio<u64>) -> Option<Time> {
        self.0.checked_div(&divisor).map(Time)
    }
}

impl Default for Time {
    fn default() -> Self {
        Time::ZERO
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exact addition. Panics if the result does not fit; the interpreter uses
/// [`Time::checked_add`] instead.
impl Add for Time {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Time {
    fn sum<I: Iterator<Item = Time>>(iter: I) -> Self {
        iter.fold(Time::ZERO, |acc, t| acc + t)
    }
}
