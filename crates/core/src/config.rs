//! Ledger configuration injected at startup.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::fees::FeeBearer;
use crate::investments::InterestBasis;

pub const DEFAULT_PLATFORM_ACCOUNT_ID: &str = "platform";
pub const DEFAULT_FEE_PERCENTAGE: Decimal = dec!(0.5);
pub const DEFAULT_MATURITY_DAYS: i32 = 30;
/// Longest loan tenor accepted anywhere, ten years.
pub const MAX_MATURITY_DAYS: i32 = 3650;
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

/// Business parameters of the ledger.
///
/// Built once by the composition root and handed to the services; nothing in
/// the core reads globals or environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerConfig {
    /// Wallet owner that collects platform fees.
    pub platform_account_id: String,
    /// Platform commission on a repaid loan, in percent of the principal.
    pub fee_percentage: Decimal,
    pub fee_bearer: FeeBearer,
    /// Used when a trip does not state its own maturity.
    pub default_maturity_days: i32,
    pub interest_basis: InterestBasis,
    /// Attempts per operation when a concurrency conflict is detected.
    pub max_conflict_retries: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            platform_account_id: DEFAULT_PLATFORM_ACCOUNT_ID.to_string(),
            fee_percentage: DEFAULT_FEE_PERCENTAGE,
            fee_bearer: FeeBearer::Borrower,
            default_maturity_days: DEFAULT_MATURITY_DAYS,
            interest_basis: InterestBasis::Flat,
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.platform_account_id.trim().is_empty() {
            return Err(Error::InvalidConfigValue(
                "platform_account_id cannot be empty".to_string(),
            ));
        }
        if self.fee_percentage < Decimal::ZERO || self.fee_percentage > Decimal::ONE_HUNDRED {
            return Err(Error::InvalidConfigValue(format!(
                "fee_percentage must be between 0 and 100, got {}",
                self.fee_percentage
            )));
        }
        if !(1..=MAX_MATURITY_DAYS).contains(&self.default_maturity_days) {
            return Err(Error::InvalidConfigValue(format!(
                "default_maturity_days must be between 1 and {}, got {}",
                MAX_MATURITY_DAYS, self.default_maturity_days
            )));
        }
        if self.max_conflict_retries == 0 {
            return Err(Error::InvalidConfigValue(
                "max_conflict_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
