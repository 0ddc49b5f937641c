//! Wallet and ledger domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::money::Money;
use crate::utils::ids::{new_id, TRANSACTION_ID_PREFIX};

/// The monetary buckets of a wallet. Each must stay non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletField {
    Balance,
    LockedAmount,
    EscrowedAmount,
    TotalInvested,
    TotalReturns,
}

impl WalletField {
    pub const ALL: [WalletField; 5] = [
        WalletField::Balance,
        WalletField::LockedAmount,
        WalletField::EscrowedAmount,
        WalletField::TotalInvested,
        WalletField::TotalReturns,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WalletField::Balance => "balance",
            WalletField::LockedAmount => "locked_amount",
            WalletField::EscrowedAmount => "escrowed_amount",
            WalletField::TotalInvested => "total_invested",
            WalletField::TotalReturns => "total_returns",
        }
    }
}

impl fmt::Display for WalletField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One wallet per user, created lazily on first access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub user_id: String,
    pub balance: Money,
    /// Funds held for a pending withdrawal.
    pub locked_amount: Money,
    /// Funds backing open bids.
    pub escrowed_amount: Money,
    pub total_invested: Money,
    pub total_returns: Money,
    /// Bumped on every applied entry; equals the sequence of the latest transaction.
    pub version: i64,
    pub updated_at: NaiveDateTime,
}

impl Wallet {
    pub fn empty(user_id: impl Into<String>, now: NaiveDateTime) -> Self {
        Self {
            user_id: user_id.into(),
            balance: Money::ZERO,
            locked_amount: Money::ZERO,
            escrowed_amount: Money::ZERO,
            total_invested: Money::ZERO,
            total_returns: Money::ZERO,
            version: 0,
            updated_at: now,
        }
    }

    pub fn amount(&self, field: WalletField) -> Money {
        match field {
            WalletField::Balance => self.balance,
            WalletField::LockedAmount => self.locked_amount,
            WalletField::EscrowedAmount => self.escrowed_amount,
            WalletField::TotalInvested => self.total_invested,
            WalletField::TotalReturns => self.total_returns,
        }
    }

    fn amount_mut(&mut self, field: WalletField) -> &mut Money {
        match field {
            WalletField::Balance => &mut self.balance,
            WalletField::LockedAmount => &mut self.locked_amount,
            WalletField::EscrowedAmount => &mut self.escrowed_amount,
            WalletField::TotalInvested => &mut self.total_invested,
            WalletField::TotalReturns => &mut self.total_returns,
        }
    }
}

/// Signed change to each wallet bucket, applied as one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDelta {
    pub balance: Money,
    pub locked: Money,
    pub escrowed: Money,
    pub invested: Money,
    pub returns: Money,
}

impl WalletDelta {
    pub fn with(mut self, field: WalletField, change: Money) -> Self {
        match field {
            WalletField::Balance => self.balance = change,
            WalletField::LockedAmount => self.locked = change,
            WalletField::EscrowedAmount => self.escrowed = change,
            WalletField::TotalInvested => self.invested = change,
            WalletField::TotalReturns => self.returns = change,
        }
        self
    }

    pub fn get(&self, field: WalletField) -> Money {
        match field {
            WalletField::Balance => self.balance,
            WalletField::LockedAmount => self.locked,
            WalletField::EscrowedAmount => self.escrowed,
            WalletField::TotalInvested => self.invested,
            WalletField::TotalReturns => self.returns,
        }
    }

    pub fn is_zero(&self) -> bool {
        WalletField::ALL.iter().all(|f| self.get(*f).is_zero())
    }

    /// Computes the wallet that results from applying this delta.
    ///
    /// Fails with `InsufficientFunds` naming the first bucket that would go
    /// negative. The returned wallet has its version bumped and `updated_at`
    /// set to `now`.
    pub fn apply_to(&self, wallet: &Wallet, now: NaiveDateTime) -> Result<Wallet> {
        let mut next = wallet.clone();
        for field in WalletField::ALL {
            let change = self.get(field);
            if change.is_zero() {
                continue;
            }
            let current = wallet.amount(field);
            let updated = current.checked_add(change).ok_or_else(|| {
                Error::Validation(ValidationError::invalid(format!(
                    "{} overflow for wallet {}",
                    field, wallet.user_id
                )))
            })?;
            if updated.is_negative() {
                return Err(Error::InsufficientFunds {
                    field,
                    required: change.abs(),
                    available: current,
                });
            }
            *next.amount_mut(field) = updated;
        }
        next.version = wallet.version + 1;
        next.updated_at = now;
        Ok(next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Balance increased by `amount`.
    Credit,
    /// Balance decreased by `amount`.
    Debit,
    /// Funds moved between non-balance buckets; balance unchanged.
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "credit",
            TransactionType::Debit => "debit",
            TransactionType::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "credit" => Ok(TransactionType::Credit),
            "debit" => Ok(TransactionType::Debit),
            "transfer" => Ok(TransactionType::Transfer),
            other => Err(Error::Validation(ValidationError::invalid(format!(
                "unknown transaction type '{}'",
                other
            )))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionCategory {
    Investment,
    Return,
    Payment,
    Refund,
    Fee,
    Withdrawal,
}

impl TransactionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionCategory::Investment => "investment",
            TransactionCategory::Return => "return",
            TransactionCategory::Payment => "payment",
            TransactionCategory::Refund => "refund",
            TransactionCategory::Fee => "fee",
            TransactionCategory::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for TransactionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "investment" => Ok(TransactionCategory::Investment),
            "return" => Ok(TransactionCategory::Return),
            "payment" => Ok(TransactionCategory::Payment),
            "refund" => Ok(TransactionCategory::Refund),
            "fee" => Ok(TransactionCategory::Fee),
            "withdrawal" => Ok(TransactionCategory::Withdrawal),
            other => Err(Error::Validation(ValidationError::invalid(format!(
                "unknown transaction category '{}'",
                other
            )))),
        }
    }
}

/// Human-readable context attached to a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Memo {
    pub description: String,
    /// Business object the entry belongs to, usually a trip id.
    pub reference_id: Option<String>,
}

impl Memo {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            reference_id: None,
        }
    }

    pub fn with_reference(mut self, reference_id: impl Into<String>) -> Self {
        self.reference_id = Some(reference_id.into());
        self
    }
}

/// A ledger entry before it is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub txn_type: TransactionType,
    pub category: TransactionCategory,
    pub amount: Money,
    pub memo: Memo,
}

impl TransactionDraft {
    pub fn new(
        txn_type: TransactionType,
        category: TransactionCategory,
        amount: Money,
        memo: Memo,
    ) -> Self {
        Self {
            txn_type,
            category,
            amount,
            memo,
        }
    }

    /// Checks the draft against the delta it is recorded with: the amount is
    /// positive and the type matches the net balance movement.
    pub fn validate_against(&self, delta: &WalletDelta) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(Error::Validation(ValidationError::invalid(format!(
                "transaction amount must be positive, got {}",
                self.amount
            ))));
        }
        if self.memo.description.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "description".to_string(),
            )));
        }
        let expected_balance_change = match self.txn_type {
            TransactionType::Credit => self.amount,
            TransactionType::Debit => -self.amount,
            TransactionType::Transfer => Money::ZERO,
        };
        if delta.balance != expected_balance_change {
            return Err(Error::Validation(ValidationError::invalid(format!(
                "{} of {} does not match balance change {}",
                self.txn_type, self.amount, delta.balance
            ))));
        }
        Ok(())
    }
}

/// Immutable, append-only ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub txn_type: TransactionType,
    pub category: TransactionCategory,
    pub amount: Money,
    pub description: String,
    pub balance_after: Money,
    /// Per-user commit order, equal to the wallet version this entry produced.
    pub sequence: i64,
    pub reference_id: Option<String>,
    pub timestamp: NaiveDateTime,
}

/// A wallet state together with the entry that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub wallet: Wallet,
    pub transaction: Transaction,
}

impl LedgerEntry {
    /// Plans the effect of applying `delta` and `draft` to `current`.
    ///
    /// Pure; the store persists the result. `balance_after` of the produced
    /// transaction is the balance of the produced wallet.
    pub fn plan(
        current: &Wallet,
        delta: &WalletDelta,
        draft: TransactionDraft,
        now: NaiveDateTime,
    ) -> Result<LedgerEntry> {
        draft.validate_against(delta)?;
        let wallet = delta.apply_to(current, now)?;
        let transaction = Transaction {
            id: new_id(TRANSACTION_ID_PREFIX),
            user_id: current.user_id.clone(),
            txn_type: draft.txn_type,
            category: draft.category,
            amount: draft.amount,
            description: draft.memo.description,
            balance_after: wallet.balance,
            sequence: wallet.version,
            reference_id: draft.memo.reference_id,
            timestamp: now,
        };
        Ok(LedgerEntry {
            wallet,
            transaction,
        })
    }
}

/// Filters for listing a user's transactions. Results are newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    #[serde(rename = "type")]
    pub txn_type: Option<TransactionType>,
    pub category: Option<TransactionCategory>,
    pub reference_id: Option<String>,
    pub limit: Option<i64>,
}

/// Aggregation key for [`super::LedgerRepositoryTrait::sum_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SumBy {
    Type(TransactionType),
    Category(TransactionCategory),
}
