//! Investment domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::money::Money;

const DAYS_PER_YEAR: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentStatus {
    /// Bid placed, funds held in the lender's escrow.
    Escrowed,
    /// Bid accepted, principal invested in the trip.
    Active,
    Completed,
    Defaulted,
    /// Bid rejected, withdrawn or its trip cancelled; escrow returned.
    Released,
}

impl InvestmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestmentStatus::Escrowed => "escrowed",
            InvestmentStatus::Active => "active",
            InvestmentStatus::Completed => "completed",
            InvestmentStatus::Defaulted => "defaulted",
            InvestmentStatus::Released => "released",
        }
    }

    pub fn can_transition_to(&self, next: InvestmentStatus) -> bool {
        matches!(
            (self, next),
            (InvestmentStatus::Escrowed, InvestmentStatus::Active)
                | (InvestmentStatus::Escrowed, InvestmentStatus::Released)
                | (InvestmentStatus::Active, InvestmentStatus::Completed)
                | (InvestmentStatus::Active, InvestmentStatus::Defaulted)
                | (InvestmentStatus::Active, InvestmentStatus::Released)
        )
    }
}

impl fmt::Display for InvestmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvestmentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "escrowed" => Ok(InvestmentStatus::Escrowed),
            "active" => Ok(InvestmentStatus::Active),
            "completed" => Ok(InvestmentStatus::Completed),
            "defaulted" => Ok(InvestmentStatus::Defaulted),
            "released" => Ok(InvestmentStatus::Released),
            other => Err(Error::Validation(ValidationError::invalid(format!(
                "unknown investment status '{}'",
                other
            )))),
        }
    }
}

/// How a bid's interest rate turns into the yield owed at repayment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestBasis {
    /// `amount * rate / 100`, regardless of tenor.
    Flat,
    /// `amount * rate * maturity_days / (100 * 365)`.
    Annualized,
}

impl InterestBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterestBasis::Flat => "flat",
            InterestBasis::Annualized => "annualized",
        }
    }
}

impl FromStr for InterestBasis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Ok(InterestBasis::Flat),
            "annualized" => Ok(InterestBasis::Annualized),
            other => Err(Error::InvalidConfigValue(format!(
                "unknown interest basis '{}'",
                other
            ))),
        }
    }
}

/// Yield owed on `amount` at `interest_rate` percent.
///
/// A non-positive `maturity_days` falls back to the flat formula.
pub fn expected_return(
    amount: Money,
    interest_rate: Decimal,
    maturity_days: i32,
    basis: InterestBasis,
) -> Result<Money> {
    if interest_rate < Decimal::ZERO {
        return Err(Error::Validation(ValidationError::invalid(format!(
            "interest rate cannot be negative, got {}",
            interest_rate
        ))));
    }
    match basis {
        InterestBasis::Annualized if maturity_days > 0 => {
            let scaled = interest_rate * Decimal::from(maturity_days)
                / Decimal::from(DAYS_PER_YEAR);
            amount.percentage(scaled)
        }
        _ => amount.percentage(interest_rate),
    }
}

/// Lender-side record of one bid on one trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: String,
    pub bid_id: String,
    pub trip_id: String,
    pub lender_id: String,
    pub amount: Money,
    pub interest_rate: Decimal,
    pub expected_return: Money,
    pub maturity_date: NaiveDateTime,
    pub status: InvestmentStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Investment {
    /// Moves the investment to `next`, enforcing the status graph.
    pub fn transition(&mut self, next: InvestmentStatus, now: NaiveDateTime) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::invalid_transition(self.status, next));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        self.status == InvestmentStatus::Active && now > self.maturity_date
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentFilter {
    pub lender_id: Option<String>,
    pub trip_id: Option<String>,
    pub status: Option<InvestmentStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn flat_return_ignores_tenor() {
        let r = expected_return(
            Money::from_minor(400_000),
            dec!(10),
            90,
            InterestBasis::Flat,
        )
        .unwrap();
        assert_eq!(r, Money::from_minor(40_000));
    }

    #[test]
    fn annualized_return_scales_with_days() {
        // 1,00,000.00 at 12% for 30 days = 986.30
        let r = expected_return(
            Money::from_minor(10_000_000),
            dec!(12),
            30,
            InterestBasis::Annualized,
        )
        .unwrap();
        assert_eq!(r, Money::from_minor(98_630));
    }

    #[test]
    fn annualized_without_tenor_falls_back_to_flat() {
        let r = expected_return(
            Money::from_minor(10_000),
            dec!(5),
            0,
            InterestBasis::Annualized,
        )
        .unwrap();
        assert_eq!(r, Money::from_minor(500));
    }

    #[test]
    fn negative_rate_is_rejected() {
        assert!(expected_return(Money::from_minor(100), dec!(-1), 30, InterestBasis::Flat).is_err());
    }

    #[test]
    fn status_graph_only_moves_forward() {
        assert!(InvestmentStatus::Escrowed.can_transition_to(InvestmentStatus::Active));
        assert!(InvestmentStatus::Active.can_transition_to(InvestmentStatus::Defaulted));
        assert!(InvestmentStatus::Active.can_transition_to(InvestmentStatus::Released));
        assert!(!InvestmentStatus::Defaulted.can_transition_to(InvestmentStatus::Released));
        assert!(!InvestmentStatus::Completed.can_transition_to(InvestmentStatus::Active));
        assert!(!InvestmentStatus::Escrowed.can_transition_to(InvestmentStatus::Completed));
        assert!(!InvestmentStatus::Released.can_transition_to(InvestmentStatus::Escrowed));
    }
}
