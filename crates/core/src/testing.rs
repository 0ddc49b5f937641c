//! In-memory stores for unit tests.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::{DatabaseError, Error, Result};
use crate::fees::{FeeStore, PlatformFee};
use crate::investments::{Investment, InvestmentStore};
use crate::lifecycle::{IdempotencyRecord, IdempotencyStore};
use crate::trips::{Trip, TripBid, TripStore};
use crate::unit_of_work::{TxJob, UnitOfWork};
use crate::utils::time_utils::now_utc;
use crate::wallets::{LedgerEntry, LedgerStore, Transaction, TransactionDraft, Wallet, WalletDelta};

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub wallets: BTreeMap<String, Wallet>,
    pub transactions: Vec<Transaction>,
    pub trips: BTreeMap<String, Trip>,
    pub bids: Vec<TripBid>,
    pub investments: BTreeMap<String, Investment>,
    pub fees: Vec<PlatformFee>,
    pub idempotency: BTreeMap<String, IdempotencyRecord>,
    /// Number of `apply` calls allowed before an injected storage failure.
    pub apply_budget: Option<usize>,
}

impl MemoryState {
    pub fn transactions_of(&self, user_id: &str) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .collect()
    }
}

impl LedgerStore for MemoryState {
    fn get_or_create_wallet(&mut self, user_id: &str) -> Result<Wallet> {
        Ok(self
            .wallets
            .entry(user_id.to_string())
            .or_insert_with(|| Wallet::empty(user_id, now_utc()))
            .clone())
    }

    fn apply(
        &mut self,
        user_id: &str,
        delta: &WalletDelta,
        draft: TransactionDraft,
    ) -> Result<LedgerEntry> {
        if let Some(budget) = self.apply_budget.as_mut() {
            if *budget == 0 {
                return Err(Error::Database(DatabaseError::Internal(
                    "injected fault".to_string(),
                )));
            }
            *budget -= 1;
        }
        let current = self.get_or_create_wallet(user_id)?;
        let entry = LedgerEntry::plan(&current, delta, draft, now_utc())?;
        self.wallets.insert(user_id.to_string(), entry.wallet.clone());
        self.transactions.push(entry.transaction.clone());
        Ok(entry)
    }
}

impl TripStore for MemoryState {
    fn insert_trip(&mut self, trip: &Trip) -> Result<()> {
        self.trips.insert(trip.id.clone(), trip.clone());
        Ok(())
    }

    fn trip_for_update(&mut self, trip_id: &str) -> Result<Trip> {
        self.trips
            .get(trip_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Trip", trip_id))
    }

    fn update_trip(&mut self, trip: &Trip) -> Result<()> {
        self.trips.insert(trip.id.clone(), trip.clone());
        Ok(())
    }

    fn insert_bid(&mut self, bid: &TripBid) -> Result<()> {
        self.bids.push(bid.clone());
        Ok(())
    }

    fn bid_for_update(&mut self, bid_id: &str) -> Result<TripBid> {
        self.bids
            .iter()
            .find(|b| b.id == bid_id)
            .cloned()
            .ok_or_else(|| Error::not_found("TripBid", bid_id))
    }

    fn bids_for_trip(&mut self, trip_id: &str) -> Result<Vec<TripBid>> {
        Ok(self
            .bids
            .iter()
            .filter(|b| b.trip_id == trip_id)
            .cloned()
            .collect())
    }

    fn update_bid(&mut self, bid: &TripBid) -> Result<()> {
        match self.bids.iter_mut().find(|b| b.id == bid.id) {
            Some(slot) => {
                *slot = bid.clone();
                Ok(())
            }
            None => Err(Error::not_found("TripBid", bid.id.clone())),
        }
    }
}

impl InvestmentStore for MemoryState {
    fn insert_investment(&mut self, investment: &Investment) -> Result<()> {
        self.investments
            .insert(investment.id.clone(), investment.clone());
        Ok(())
    }

    fn investment_for_update(&mut self, investment_id: &str) -> Result<Investment> {
        self.investments
            .get(investment_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Investment", investment_id))
    }

    fn investment_for_bid(&mut self, bid_id: &str) -> Result<Option<Investment>> {
        Ok(self
            .investments
            .values()
            .find(|i| i.bid_id == bid_id)
            .cloned())
    }

    fn update_investment(&mut self, investment: &Investment) -> Result<()> {
        self.insert_investment(investment)
    }
}

impl FeeStore for MemoryState {
    fn insert_platform_fee(&mut self, fee: &PlatformFee) -> Result<()> {
        self.fees.push(fee.clone());
        Ok(())
    }
}

impl IdempotencyStore for MemoryState {
    fn get_idempotency_record(&mut self, key: &str) -> Result<Option<IdempotencyRecord>> {
        Ok(self.idempotency.get(key).cloned())
    }

    fn insert_idempotency_record(&mut self, record: &IdempotencyRecord) -> Result<()> {
        if self.idempotency.contains_key(&record.key) {
            return Err(Error::Database(DatabaseError::UniqueViolation(
                record.key.clone(),
            )));
        }
        self.idempotency.insert(record.key.clone(), record.clone());
        Ok(())
    }
}

/// Runs each job against a copy of the state and keeps the copy only on success.
#[derive(Default)]
pub struct MemoryUnitOfWork {
    state: Mutex<MemoryState>,
}

impl MemoryUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MemoryState {
        self.state.lock().unwrap().clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut MemoryState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn execute_boxed(&self, job: TxJob) -> Result<Box<dyn Any + Send>> {
        let mut guard = self.state.lock().unwrap();
        let mut working = guard.clone();
        let result = job(&mut working)?;
        *guard = working;
        Ok(result)
    }
}
