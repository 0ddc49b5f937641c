use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::money::Money;

/// Which party pays the platform fee at repayment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeBearer {
    Borrower,
    Lender,
}

impl FeeBearer {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeBearer::Borrower => "borrower",
            FeeBearer::Lender => "lender",
        }
    }
}

impl fmt::Display for FeeBearer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeeBearer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "borrower" => Ok(FeeBearer::Borrower),
            "lender" => Ok(FeeBearer::Lender),
            other => Err(Error::InvalidConfigValue(format!(
                "unknown fee bearer '{}'",
                other
            ))),
        }
    }
}

/// The platform's cut of one repaid loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformFee {
    pub id: String,
    pub trip_id: String,
    pub lender_id: String,
    pub borrower_id: String,
    pub loan_amount: Money,
    pub fee_percentage: Decimal,
    pub fee_amount: Money,
    pub fee_bearer: FeeBearer,
    /// Credit to the platform account. `None` when the fee rounded to zero.
    pub platform_transaction_id: Option<String>,
    /// Debit of the paying party. `None` when the fee rounded to zero.
    pub payer_transaction_id: Option<String>,
    pub collected_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformFeeFilter {
    pub trip_id: Option<String>,
    pub lender_id: Option<String>,
    pub borrower_id: Option<String>,
    /// Inclusive lower bound on `collected_at`.
    pub from: Option<NaiveDateTime>,
    /// Inclusive upper bound on `collected_at`.
    pub to: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformFeeStats {
    pub total_fees: Money,
    pub total_transactions: i64,
    pub average_fee: Money,
    pub total_loan_amount: Money,
}

impl PlatformFeeStats {
    pub fn from_fees(fees: &[PlatformFee]) -> Result<Self> {
        let total_fees = Money::try_sum(fees.iter().map(|f| f.fee_amount), "total fees")?;
        let total_loan_amount =
            Money::try_sum(fees.iter().map(|f| f.loan_amount), "total loan amount")?;
        let total_transactions = fees.len() as i64;
        let average_fee = if total_transactions == 0 {
            Money::ZERO
        } else {
            Money::from_minor(total_fees.minor() / total_transactions)
        };
        Ok(Self {
            total_fees,
            total_transactions,
            average_fee,
            total_loan_amount,
        })
    }
}
