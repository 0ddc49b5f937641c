use std::sync::Arc;

use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use freightfin_core::money::Money;
use freightfin_core::wallets::{
    LedgerRepositoryTrait, SumBy, Transaction, TransactionFilter, Wallet,
};
use freightfin_core::{Error, Result};

use super::model::{TransactionDB, WalletDB};
use crate::db::get_connection;
use crate::errors::StorageError;
use crate::schema::{ledger_transactions, wallets};

pub struct LedgerRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl LedgerRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        LedgerRepository { pool }
    }
}

impl LedgerRepositoryTrait for LedgerRepository {
    fn get_wallet(&self, user_id: &str) -> Result<Option<Wallet>> {
        let mut conn = get_connection(&self.pool)?;
        let row = wallets::table
            .find(user_id)
            .select(WalletDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Wallet::from))
    }

    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        ledger_transactions::table
            .find(transaction_id)
            .select(TransactionDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| Error::not_found("Transaction", transaction_id))
            .and_then(Transaction::try_from)
    }

    fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = ledger_transactions::table
            .filter(ledger_transactions::user_id.eq(user_id))
            .select(TransactionDB::as_select())
            .into_boxed();

        if let Some(txn_type) = filter.txn_type {
            query = query.filter(ledger_transactions::txn_type.eq(txn_type.as_str()));
        }
        if let Some(category) = filter.category {
            query = query.filter(ledger_transactions::category.eq(category.as_str()));
        }
        if let Some(reference_id) = &filter.reference_id {
            query = query.filter(ledger_transactions::reference_id.eq(reference_id.clone()));
        }
        query = query.order(ledger_transactions::sequence.desc());
        if let Some(limit) = filter.limit {
            query = query.limit(limit.max(0));
        }

        query
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    fn sum_by(&self, user_id: &str, key: SumBy) -> Result<Money> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = ledger_transactions::table
            .filter(ledger_transactions::user_id.eq(user_id))
            .select(ledger_transactions::amount)
            .into_boxed();
        query = match key {
            SumBy::Type(txn_type) => {
                query.filter(ledger_transactions::txn_type.eq(txn_type.as_str()))
            }
            SumBy::Category(category) => {
                query.filter(ledger_transactions::category.eq(category.as_str()))
            }
        };
        let amounts: Vec<i64> = query.load(&mut conn).map_err(StorageError::from)?;
        Money::try_sum(amounts.into_iter().map(Money::from_minor), "transaction total")
    }
}
