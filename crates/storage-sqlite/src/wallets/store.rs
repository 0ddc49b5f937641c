use diesel::prelude::*;
use log::debug;

use freightfin_core::errors::{Error, Result};
use freightfin_core::utils::time_utils::now_utc;
use freightfin_core::wallets::{LedgerEntry, LedgerStore, TransactionDraft, Wallet, WalletDelta};

use super::model::{TransactionDB, WalletChangesetDB, WalletDB};
use crate::errors::StorageError;
use crate::schema::{ledger_transactions, wallets};
use crate::unit_of_work::SqliteStoreTransaction;

impl LedgerStore for SqliteStoreTransaction<'_> {
    fn get_or_create_wallet(&mut self, user_id: &str) -> Result<Wallet> {
        let empty = WalletDB::from(&Wallet::empty(user_id, now_utc()));
        diesel::insert_into(wallets::table)
            .values(&empty)
            .on_conflict(wallets::user_id)
            .do_nothing()
            .execute(self.conn)
            .map_err(StorageError::from)?;

        let row = wallets::table
            .find(user_id)
            .select(WalletDB::as_select())
            .first(self.conn)
            .map_err(StorageError::from)?;
        Ok(Wallet::from(row))
    }

    fn apply(
        &mut self,
        user_id: &str,
        delta: &WalletDelta,
        draft: TransactionDraft,
    ) -> Result<LedgerEntry> {
        let current = self.get_or_create_wallet(user_id)?;
        let entry = LedgerEntry::plan(&current, delta, draft, now_utc())?;

        let updated = diesel::update(
            wallets::table
                .filter(wallets::user_id.eq(user_id))
                .filter(wallets::version.eq(current.version)),
        )
        .set(&WalletChangesetDB::from(&entry.wallet))
        .execute(self.conn)
        .map_err(StorageError::from)?;

        if updated == 0 {
            return Err(Error::ConcurrencyConflict(format!(
                "wallet {} changed after version {}",
                user_id, current.version
            )));
        }

        diesel::insert_into(ledger_transactions::table)
            .values(&TransactionDB::from(&entry.transaction))
            .execute(self.conn)
            .map_err(StorageError::from)?;

        debug!(
            "Ledger {} {} {} for {} (seq {})",
            entry.transaction.txn_type,
            entry.transaction.category,
            entry.transaction.amount,
            user_id,
            entry.transaction.sequence
        );
        Ok(entry)
    }
}
