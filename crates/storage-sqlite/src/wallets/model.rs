//! Database models for wallets and ledger transactions.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use freightfin_core::money::Money;
use freightfin_core::wallets::{Transaction, Wallet};

use crate::utils::parse_column;

#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::wallets)]
#[diesel(primary_key(user_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct WalletDB {
    pub user_id: String,
    pub balance: i64,
    pub locked_amount: i64,
    pub escrowed_amount: i64,
    pub total_invested: i64,
    pub total_returns: i64,
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Bucket values written by a versioned update.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::wallets)]
pub struct WalletChangesetDB {
    pub balance: i64,
    pub locked_amount: i64,
    pub escrowed_amount: i64,
    pub total_invested: i64,
    pub total_returns: i64,
    pub version: i64,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::ledger_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct TransactionDB {
    pub id: String,
    pub user_id: String,
    pub txn_type: String,
    pub category: String,
    pub amount: i64,
    pub description: String,
    pub balance_after: i64,
    pub sequence: i64,
    pub reference_id: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<WalletDB> for Wallet {
    fn from(db: WalletDB) -> Self {
        Self {
            user_id: db.user_id,
            balance: Money::from_minor(db.balance),
            locked_amount: Money::from_minor(db.locked_amount),
            escrowed_amount: Money::from_minor(db.escrowed_amount),
            total_invested: Money::from_minor(db.total_invested),
            total_returns: Money::from_minor(db.total_returns),
            version: db.version,
            updated_at: db.updated_at,
        }
    }
}

impl From<&Wallet> for WalletDB {
    fn from(wallet: &Wallet) -> Self {
        Self {
            user_id: wallet.user_id.clone(),
            balance: wallet.balance.minor(),
            locked_amount: wallet.locked_amount.minor(),
            escrowed_amount: wallet.escrowed_amount.minor(),
            total_invested: wallet.total_invested.minor(),
            total_returns: wallet.total_returns.minor(),
            version: wallet.version,
            created_at: wallet.updated_at,
            updated_at: wallet.updated_at,
        }
    }
}

impl From<&Wallet> for WalletChangesetDB {
    fn from(wallet: &Wallet) -> Self {
        Self {
            balance: wallet.balance.minor(),
            locked_amount: wallet.locked_amount.minor(),
            escrowed_amount: wallet.escrowed_amount.minor(),
            total_invested: wallet.total_invested.minor(),
            total_returns: wallet.total_returns.minor(),
            version: wallet.version,
            updated_at: wallet.updated_at,
        }
    }
}

impl From<&Transaction> for TransactionDB {
    fn from(txn: &Transaction) -> Self {
        Self {
            id: txn.id.clone(),
            user_id: txn.user_id.clone(),
            txn_type: txn.txn_type.as_str().to_string(),
            category: txn.category.as_str().to_string(),
            amount: txn.amount.minor(),
            description: txn.description.clone(),
            balance_after: txn.balance_after.minor(),
            sequence: txn.sequence,
            reference_id: txn.reference_id.clone(),
            created_at: txn.timestamp,
        }
    }
}

impl TryFrom<TransactionDB> for Transaction {
    type Error = freightfin_core::Error;

    fn try_from(db: TransactionDB) -> Result<Self, Self::Error> {
        Ok(Self {
            txn_type: parse_column("txn_type", &db.txn_type)?,
            category: parse_column("category", &db.category)?,
            id: db.id,
            user_id: db.user_id,
            amount: Money::from_minor(db.amount),
            description: db.description,
            balance_after: Money::from_minor(db.balance_after),
            sequence: db.sequence,
            reference_id: db.reference_id,
            timestamp: db.created_at,
        })
    }
}
