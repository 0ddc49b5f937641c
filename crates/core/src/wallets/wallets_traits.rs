use async_trait::async_trait;

use super::wallets_model::{
    LedgerEntry, SumBy, Transaction, TransactionCategory, TransactionDraft, TransactionFilter,
    Wallet, WalletDelta,
};
use crate::errors::Result;
use crate::money::Money;

/// Write side of the ledger, scoped to one unit of work.
///
/// Implementations run inside an atomic transaction: every `apply` either
/// commits together with the rest of the unit of work or not at all.
pub trait LedgerStore {
    /// Returns the user's wallet, creating an empty one if absent. Inside a
    /// unit of work the returned row is the one later `apply` calls build on.
    fn get_or_create_wallet(&mut self, user_id: &str) -> Result<Wallet>;

    /// Applies `delta` to the wallet and appends the matching transaction.
    ///
    /// Fails with `InsufficientFunds` if any bucket would go negative and with
    /// `ConcurrencyConflict` if the wallet changed since it was read.
    fn apply(
        &mut self,
        user_id: &str,
        delta: &WalletDelta,
        draft: TransactionDraft,
    ) -> Result<LedgerEntry>;
}

/// Read side of the ledger.
pub trait LedgerRepositoryTrait: Send + Sync {
    fn get_wallet(&self, user_id: &str) -> Result<Option<Wallet>>;

    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction>;

    fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>>;

    fn sum_by(&self, user_id: &str, key: SumBy) -> Result<Money>;
}

#[async_trait]
pub trait WalletServiceTrait: Send + Sync {
    /// Returns the wallet, creating an empty one on first access.
    async fn get_or_create_wallet(&self, user_id: &str) -> Result<Wallet>;

    async fn credit(
        &self,
        user_id: &str,
        amount: Money,
        category: TransactionCategory,
        description: &str,
    ) -> Result<LedgerEntry>;

    async fn debit(
        &self,
        user_id: &str,
        amount: Money,
        category: TransactionCategory,
        description: &str,
    ) -> Result<LedgerEntry>;

    async fn move_to_escrow(&self, user_id: &str, amount: Money) -> Result<LedgerEntry>;

    async fn escrow_to_invested(&self, user_id: &str, amount: Money) -> Result<LedgerEntry>;

    async fn release_escrow(&self, user_id: &str, amount: Money) -> Result<LedgerEntry>;

    async fn return_investment(
        &self,
        user_id: &str,
        principal: Money,
        yield_amount: Money,
    ) -> Result<LedgerEntry>;

    async fn lock_for_withdrawal(&self, user_id: &str, amount: Money) -> Result<LedgerEntry>;

    async fn settle_withdrawal(&self, user_id: &str, amount: Money) -> Result<LedgerEntry>;

    async fn release_withdrawal(&self, user_id: &str, amount: Money) -> Result<LedgerEntry>;

    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction>;

    fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>>;

    fn sum_by(&self, user_id: &str, key: SumBy) -> Result<Money>;
}
