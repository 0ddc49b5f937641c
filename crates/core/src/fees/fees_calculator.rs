//! Platform fee calculation and realization.

use chrono::NaiveDateTime;
use log::debug;
use rust_decimal::Decimal;

use super::fees_model::{FeeBearer, PlatformFee};
use super::fees_traits::FeeStore;
use crate::errors::{Error, Result, ValidationError};
use crate::money::Money;
use crate::utils::ids::{new_id, PLATFORM_FEE_ID_PREFIX};
use crate::wallets::{wallets_ops, LedgerStore, Memo, TransactionCategory};

/// Parties and terms of one fee collection.
#[derive(Debug, Clone)]
pub struct FeeContext<'a> {
    pub trip_id: &'a str,
    pub lender_id: &'a str,
    pub borrower_id: &'a str,
    pub loan_amount: Money,
    pub fee_percentage: Decimal,
    pub fee_bearer: FeeBearer,
    pub platform_account_id: &'a str,
}

impl FeeContext<'_> {
    fn payer_id(&self) -> &str {
        match self.fee_bearer {
            FeeBearer::Borrower => self.borrower_id,
            FeeBearer::Lender => self.lender_id,
        }
    }
}

/// `loan_amount * fee_percentage / 100`, rounded to the minor unit.
pub fn compute_fee(loan_amount: Money, fee_percentage: Decimal) -> Result<Money> {
    if fee_percentage < Decimal::ZERO || fee_percentage > Decimal::ONE_HUNDRED {
        return Err(Error::Validation(ValidationError::invalid(format!(
            "fee percentage must be between 0 and 100, got {}",
            fee_percentage
        ))));
    }
    loan_amount.percentage(fee_percentage)
}

/// Computes the fee, realizes it as a debit of the paying party and a credit
/// of the platform account, and persists the fee record.
///
/// A fee that rounds to zero is recorded without ledger entries.
pub fn compute_and_record<S>(
    store: &mut S,
    ctx: &FeeContext<'_>,
    now: NaiveDateTime,
) -> Result<PlatformFee>
where
    S: LedgerStore + FeeStore + ?Sized,
{
    let fee_amount = compute_fee(ctx.loan_amount, ctx.fee_percentage)?;

    let (payer_transaction_id, platform_transaction_id) = if fee_amount.is_positive() {
        let payer = wallets_ops::debit(
            store,
            ctx.payer_id(),
            fee_amount,
            TransactionCategory::Fee,
            Memo::new(format!(
                "Platform fee ({}%) for trip {}",
                ctx.fee_percentage, ctx.trip_id
            ))
            .with_reference(ctx.trip_id),
        )?;
        let platform = wallets_ops::credit(
            store,
            ctx.platform_account_id,
            fee_amount,
            TransactionCategory::Fee,
            Memo::new(format!(
                "Platform fee ({}%) from trip {}",
                ctx.fee_percentage, ctx.trip_id
            ))
            .with_reference(ctx.trip_id),
        )?;
        (Some(payer.transaction.id), Some(platform.transaction.id))
    } else {
        debug!("Fee for trip {} rounds to zero, no ledger entries", ctx.trip_id);
        (None, None)
    };

    let fee = PlatformFee {
        id: new_id(PLATFORM_FEE_ID_PREFIX),
        trip_id: ctx.trip_id.to_string(),
        lender_id: ctx.lender_id.to_string(),
        borrower_id: ctx.borrower_id.to_string(),
        loan_amount: ctx.loan_amount,
        fee_percentage: ctx.fee_percentage,
        fee_amount,
        fee_bearer: ctx.fee_bearer,
        platform_transaction_id,
        payer_transaction_id,
        collected_at: now,
        created_at: now,
    };
    store.insert_platform_fee(&fee)?;
    Ok(fee)
}
