//! Atomic units of work spanning every store.
//!
//! A unit of work hands a job a [`StoreTransaction`]: all wallet, trip,
//! investment, fee and idempotency writes made through it commit together or
//! not at all. Storage backends implement [`UnitOfWork`]; services use the
//! typed [`UnitOfWorkExt::run`].

use std::any::Any;

use async_trait::async_trait;

use crate::errors::{Error, Result};
use crate::fees::FeeStore;
use crate::investments::InvestmentStore;
use crate::lifecycle::IdempotencyStore;
use crate::trips::TripStore;
use crate::wallets::LedgerStore;

/// Every store, as seen from inside one atomic transaction.
pub trait StoreTransaction:
    LedgerStore + TripStore + InvestmentStore + FeeStore + IdempotencyStore
{
}

impl<T> StoreTransaction for T where
    T: LedgerStore + TripStore + InvestmentStore + FeeStore + IdempotencyStore
{
}

/// Type-erased job handed to a [`UnitOfWork`].
pub type TxJob =
    Box<dyn FnOnce(&mut dyn StoreTransaction) -> Result<Box<dyn Any + Send>> + Send + 'static>;

#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Runs `job` in one transaction. Commits on `Ok`, rolls back on `Err`.
    async fn execute_boxed(&self, job: TxJob) -> Result<Box<dyn Any + Send>>;
}

#[async_trait]
pub trait UnitOfWorkExt {
    async fn run<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn StoreTransaction) -> Result<T> + Send + 'static;
}

#[async_trait]
impl<U: UnitOfWork + ?Sized> UnitOfWorkExt for U {
    async fn run<T, F>(&self, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn StoreTransaction) -> Result<T> + Send + 'static,
    {
        let boxed = self
            .execute_boxed(Box::new(move |tx| {
                job(tx).map(|value| Box::new(value) as Box<dyn Any + Send>)
            }))
            .await?;
        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| Error::Unexpected("unit of work returned an unexpected type".to_string()))
    }
}
