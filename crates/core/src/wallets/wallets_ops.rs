//! Wallet operations expressed over a [`LedgerStore`].
//!
//! Every operation is one `apply` call: a delta over the wallet buckets plus
//! exactly one transaction describing the balance movement. Callers compose
//! them inside a unit of work.

use super::wallets_model::{
    LedgerEntry, Memo, TransactionCategory, TransactionDraft, TransactionType, WalletDelta,
};
use super::wallets_traits::LedgerStore;
use crate::errors::{Error, Result, ValidationError};
use crate::money::Money;

fn ensure_positive(amount: Money, what: &str) -> Result<()> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(Error::Validation(ValidationError::invalid(format!(
            "{} must be positive, got {}",
            what, amount
        ))))
    }
}

fn memo_or(memo: Option<Memo>, default: String) -> Memo {
    memo.unwrap_or_else(|| Memo::new(default))
}

/// Adds `amount` to the balance.
pub fn credit<S: LedgerStore + ?Sized>(
    store: &mut S,
    user_id: &str,
    amount: Money,
    category: TransactionCategory,
    memo: Memo,
) -> Result<LedgerEntry> {
    ensure_positive(amount, "credit amount")?;
    let delta = WalletDelta::default().with(super::WalletField::Balance, amount);
    store.apply(
        user_id,
        &delta,
        TransactionDraft::new(TransactionType::Credit, category, amount, memo),
    )
}

/// Removes `amount` from the balance.
pub fn debit<S: LedgerStore + ?Sized>(
    store: &mut S,
    user_id: &str,
    amount: Money,
    category: TransactionCategory,
    memo: Memo,
) -> Result<LedgerEntry> {
    ensure_positive(amount, "debit amount")?;
    let delta = WalletDelta::default().with(super::WalletField::Balance, -amount);
    store.apply(
        user_id,
        &delta,
        TransactionDraft::new(TransactionType::Debit, category, amount, memo),
    )
}

/// balance -> escrowed. Backs a bid.
pub fn move_to_escrow<S: LedgerStore + ?Sized>(
    store: &mut S,
    user_id: &str,
    amount: Money,
    memo: Option<Memo>,
) -> Result<LedgerEntry> {
    ensure_positive(amount, "escrow amount")?;
    let delta = WalletDelta {
        balance: -amount,
        escrowed: amount,
        ..WalletDelta::default()
    };
    let memo = memo_or(memo, format!("Moved ₹{} to escrow", amount));
    store.apply(
        user_id,
        &delta,
        TransactionDraft::new(
            TransactionType::Debit,
            TransactionCategory::Investment,
            amount,
            memo,
        ),
    )
}

/// escrowed -> invested. The bid was accepted.
pub fn escrow_to_invested<S: LedgerStore + ?Sized>(
    store: &mut S,
    user_id: &str,
    amount: Money,
    memo: Option<Memo>,
) -> Result<LedgerEntry> {
    ensure_positive(amount, "investment amount")?;
    let delta = WalletDelta {
        escrowed: -amount,
        invested: amount,
        ..WalletDelta::default()
    };
    let memo = memo_or(memo, format!("Invested ₹{} from escrow", amount));
    store.apply(
        user_id,
        &delta,
        TransactionDraft::new(
            TransactionType::Transfer,
            TransactionCategory::Investment,
            amount,
            memo,
        ),
    )
}

/// escrowed -> balance. The bid was rejected, withdrawn or its trip cancelled.
pub fn release_escrow<S: LedgerStore + ?Sized>(
    store: &mut S,
    user_id: &str,
    amount: Money,
    memo: Option<Memo>,
) -> Result<LedgerEntry> {
    ensure_positive(amount, "release amount")?;
    let delta = WalletDelta {
        balance: amount,
        escrowed: -amount,
        ..WalletDelta::default()
    };
    let memo = memo_or(memo, format!("Released ₹{} from escrow", amount));
    store.apply(
        user_id,
        &delta,
        TransactionDraft::new(
            TransactionType::Credit,
            TransactionCategory::Refund,
            amount,
            memo,
        ),
    )
}

/// Repays principal plus yield to a lender.
///
/// invested decreases by `principal`, returns grows by `yield_amount` and the
/// balance receives both. Recorded as a single credit of the total.
pub fn return_investment<S: LedgerStore + ?Sized>(
    store: &mut S,
    user_id: &str,
    principal: Money,
    yield_amount: Money,
    memo: Option<Memo>,
) -> Result<LedgerEntry> {
    ensure_positive(principal, "principal")?;
    if yield_amount.is_negative() {
        return Err(Error::Validation(ValidationError::invalid(format!(
            "yield cannot be negative, got {}",
            yield_amount
        ))));
    }
    let total = principal.checked_add(yield_amount).ok_or_else(|| {
        Error::Validation(ValidationError::invalid("repayment total overflows"))
    })?;
    let delta = WalletDelta {
        balance: total,
        invested: -principal,
        returns: yield_amount,
        ..WalletDelta::default()
    };
    let memo = memo_or(
        memo,
        format!(
            "Investment returned: ₹{} principal + ₹{} interest",
            principal, yield_amount
        ),
    );
    store.apply(
        user_id,
        &delta,
        TransactionDraft::new(
            TransactionType::Credit,
            TransactionCategory::Return,
            total,
            memo,
        ),
    )
}

/// invested -> balance. The funded trip was cancelled before repayment, so
/// the principal comes back without yield.
pub fn unwind_investment<S: LedgerStore + ?Sized>(
    store: &mut S,
    user_id: &str,
    principal: Money,
    memo: Option<Memo>,
) -> Result<LedgerEntry> {
    ensure_positive(principal, "principal")?;
    let delta = WalletDelta {
        balance: principal,
        invested: -principal,
        ..WalletDelta::default()
    };
    let memo = memo_or(memo, format!("Investment of ₹{} unwound", principal));
    store.apply(
        user_id,
        &delta,
        TransactionDraft::new(
            TransactionType::Credit,
            TransactionCategory::Refund,
            principal,
            memo,
        ),
    )
}

/// balance -> locked, pending an external payout.
pub fn lock_for_withdrawal<S: LedgerStore + ?Sized>(
    store: &mut S,
    user_id: &str,
    amount: Money,
) -> Result<LedgerEntry> {
    ensure_positive(amount, "withdrawal amount")?;
    let delta = WalletDelta {
        balance: -amount,
        locked: amount,
        ..WalletDelta::default()
    };
    store.apply(
        user_id,
        &delta,
        TransactionDraft::new(
            TransactionType::Debit,
            TransactionCategory::Withdrawal,
            amount,
            Memo::new(format!("Locked ₹{} for withdrawal", amount)),
        ),
    )
}

/// Removes locked funds once the payout went through.
pub fn settle_withdrawal<S: LedgerStore + ?Sized>(
    store: &mut S,
    user_id: &str,
    amount: Money,
) -> Result<LedgerEntry> {
    ensure_positive(amount, "withdrawal amount")?;
    let delta = WalletDelta::default().with(super::WalletField::LockedAmount, -amount);
    store.apply(
        user_id,
        &delta,
        TransactionDraft::new(
            TransactionType::Transfer,
            TransactionCategory::Withdrawal,
            amount,
            Memo::new(format!("Withdrawal of ₹{} settled", amount)),
        ),
    )
}

/// locked -> balance. The payout failed or was cancelled.
pub fn release_withdrawal<S: LedgerStore + ?Sized>(
    store: &mut S,
    user_id: &str,
    amount: Money,
) -> Result<LedgerEntry> {
    ensure_positive(amount, "withdrawal amount")?;
    let delta = WalletDelta {
        balance: amount,
        locked: -amount,
        ..WalletDelta::default()
    };
    store.apply(
        user_id,
        &delta,
        TransactionDraft::new(
            TransactionType::Credit,
            TransactionCategory::Refund,
            amount,
            Memo::new(format!("Withdrawal of ₹{} cancelled", amount)),
        ),
    )
}

/// Touches the given wallets in ascending user id order.
///
/// Multi-wallet operations call this first so that concurrent units of work
/// always acquire wallets in the same order.
pub fn lock_wallets<S: LedgerStore + ?Sized>(store: &mut S, user_ids: &[&str]) -> Result<()> {
    let mut ordered: Vec<&str> = user_ids.to_vec();
    ordered.sort_unstable();
    ordered.dedup();
    for user_id in ordered {
        store.get_or_create_wallet(user_id)?;
    }
    Ok(())
}
