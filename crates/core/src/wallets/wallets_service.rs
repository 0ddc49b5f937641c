use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::wallets_model::{
    LedgerEntry, Memo, SumBy, Transaction, TransactionCategory, TransactionFilter, Wallet,
};
use super::wallets_ops;
use super::wallets_traits::{LedgerRepositoryTrait, LedgerStore, WalletServiceTrait};
use crate::errors::Result;
use crate::money::Money;
use crate::unit_of_work::{StoreTransaction, UnitOfWork, UnitOfWorkExt};
use crate::utils::retry::with_conflict_retry;

/// Single-wallet operations, each in its own unit of work.
pub struct WalletService {
    unit_of_work: Arc<dyn UnitOfWork>,
    repository: Arc<dyn LedgerRepositoryTrait>,
    max_attempts: u32,
}

impl WalletService {
    pub fn new(
        unit_of_work: Arc<dyn UnitOfWork>,
        repository: Arc<dyn LedgerRepositoryTrait>,
        max_attempts: u32,
    ) -> Self {
        Self {
            unit_of_work,
            repository,
            max_attempts,
        }
    }

    async fn apply_op<F>(&self, operation: &str, user_id: &str, op: F) -> Result<LedgerEntry>
    where
        F: Fn(&mut dyn StoreTransaction, &str) -> Result<LedgerEntry>
            + Clone
            + Send
            + Sync
            + 'static,
    {
        debug!("{} for wallet {}", operation, user_id);
        with_conflict_retry(operation, self.max_attempts, || {
            let user_id = user_id.to_string();
            let op = op.clone();
            self.unit_of_work.run(move |tx| op(tx, &user_id))
        })
        .await
    }
}

#[async_trait]
impl WalletServiceTrait for WalletService {
    async fn get_or_create_wallet(&self, user_id: &str) -> Result<Wallet> {
        if let Some(wallet) = self.repository.get_wallet(user_id)? {
            return Ok(wallet);
        }
        with_conflict_retry("get_or_create_wallet", self.max_attempts, || {
            let user_id = user_id.to_string();
            self.unit_of_work
                .run(move |tx| tx.get_or_create_wallet(&user_id))
        })
        .await
    }

    async fn credit(
        &self,
        user_id: &str,
        amount: Money,
        category: TransactionCategory,
        description: &str,
    ) -> Result<LedgerEntry> {
        let memo = Memo::new(description);
        self.apply_op("credit", user_id, move |tx, user| {
            wallets_ops::credit(tx, user, amount, category, memo.clone())
        })
        .await
    }

    async fn debit(
        &self,
        user_id: &str,
        amount: Money,
        category: TransactionCategory,
        description: &str,
    ) -> Result<LedgerEntry> {
        let memo = Memo::new(description);
        self.apply_op("debit", user_id, move |tx, user| {
            wallets_ops::debit(tx, user, amount, category, memo.clone())
        })
        .await
    }

    async fn move_to_escrow(&self, user_id: &str, amount: Money) -> Result<LedgerEntry> {
        self.apply_op("move_to_escrow", user_id, move |tx, user| {
            wallets_ops::move_to_escrow(tx, user, amount, None)
        })
        .await
    }

    async fn escrow_to_invested(&self, user_id: &str, amount: Money) -> Result<LedgerEntry> {
        self.apply_op("escrow_to_invested", user_id, move |tx, user| {
            wallets_ops::escrow_to_invested(tx, user, amount, None)
        })
        .await
    }

    async fn release_escrow(&self, user_id: &str, amount: Money) -> Result<LedgerEntry> {
        self.apply_op("release_escrow", user_id, move |tx, user| {
            wallets_ops::release_escrow(tx, user, amount, None)
        })
        .await
    }

    async fn return_investment(
        &self,
        user_id: &str,
        principal: Money,
        yield_amount: Money,
    ) -> Result<LedgerEntry> {
        self.apply_op("return_investment", user_id, move |tx, user| {
            wallets_ops::return_investment(tx, user, principal, yield_amount, None)
        })
        .await
    }

    async fn lock_for_withdrawal(&self, user_id: &str, amount: Money) -> Result<LedgerEntry> {
        self.apply_op("lock_for_withdrawal", user_id, move |tx, user| {
            wallets_ops::lock_for_withdrawal(tx, user, amount)
        })
        .await
    }

    async fn settle_withdrawal(&self, user_id: &str, amount: Money) -> Result<LedgerEntry> {
        self.apply_op("settle_withdrawal", user_id, move |tx, user| {
            wallets_ops::settle_withdrawal(tx, user, amount)
        })
        .await
    }

    async fn release_withdrawal(&self, user_id: &str, amount: Money) -> Result<LedgerEntry> {
        self.apply_op("release_withdrawal", user_id, move |tx, user| {
            wallets_ops::release_withdrawal(tx, user, amount)
        })
        .await
    }

    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        self.repository.get_transaction(transaction_id)
    }

    fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>> {
        self.repository.list_transactions(user_id, filter)
    }

    fn sum_by(&self, user_id: &str, key: SumBy) -> Result<Money> {
        self.repository.sum_by(user_id, key)
    }
}
