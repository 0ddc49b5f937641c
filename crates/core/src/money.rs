//! Fixed-point money in minor units (paise).
//!
//! All ledger arithmetic happens on `i64` minor units. Conversion to and from
//! decimal major units happens only at the boundary.

use std::fmt;
use std::ops::Neg;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Number of decimal places carried by one minor unit.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// A signed amount of money in minor units.
///
/// Stored amounts are never negative; signed values only appear in
/// [`crate::wallets::WalletDelta`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Converts a decimal amount in major units (rupees) to minor units.
    ///
    /// Amounts with more precision than one minor unit are rejected rather
    /// than silently rounded.
    pub fn from_major(amount: Decimal) -> Result<Self> {
        let scaled = amount * Decimal::from(10_i64.pow(MINOR_UNIT_SCALE));
        if scaled.fract() != Decimal::ZERO {
            return Err(Error::Validation(ValidationError::invalid(format!(
                "amount {} has more than {} decimal places",
                amount, MINOR_UNIT_SCALE
            ))));
        }
        scaled.to_i64().map(Money).ok_or_else(|| {
            Error::Validation(ValidationError::invalid(format!(
                "amount {} is out of range",
                amount
            )))
        })
    }

    pub fn to_major(self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }

    /// `self * percentage / 100`, rounded to the nearest minor unit
    /// (banker's rounding).
    pub fn percentage(self, percentage: Decimal) -> Result<Self> {
        let raw = Decimal::from(self.0) * percentage / Decimal::ONE_HUNDRED;
        raw.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i64()
            .map(Money)
            .ok_or_else(|| {
                Error::Validation(ValidationError::invalid(format!(
                    "{}% of {} is out of range",
                    percentage, self
                )))
            })
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// `self + other`, or a validation error naming `what` when the total
    /// does not fit in minor units.
    pub fn try_add(self, other: Money, what: &str) -> Result<Money> {
        self.checked_add(other).ok_or_else(|| {
            Error::Validation(ValidationError::invalid(format!(
                "{} overflows: {} + {}",
                what, self, other
            )))
        })
    }

    /// Sums `amounts`, failing instead of wrapping on overflow.
    pub fn try_sum<I>(amounts: I, what: &str) -> Result<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, m| acc.try_add(m, what))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Money {
        Money(self.0.abs())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_major())
    }
}

// Only applied to amounts already checked to be positive.
impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}
