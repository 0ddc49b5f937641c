//! Investment lifecycle coordinator.
//!
//! Each public operation is one unit of work: the wallet movements, registry
//! updates, investment and fee records of an operation commit together or not
//! at all. Domain events are emitted only after the commit.

use std::sync::Arc;

use chrono::NaiveDateTime;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::commands::{
    Allotment, BidPlacement, BidWithdrawal, Cancellation, CommandOutcome, LedgerCommand,
    PlaceBid, Repayment,
};
use super::idempotency::{compute_idempotency_key, IdempotencyRecord, IdempotencyStore};
use crate::config::LedgerConfig;
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::fees::{compute_and_record, FeeContext};
use crate::investments::{expected_return, Investment, InvestmentStatus, InvestmentStore};
use crate::trips::{
    can_transition, forward_path, trips_registry, BidStatus, NewBid, TripBid, TripStatus,
    TripStore,
};
use crate::unit_of_work::{StoreTransaction, UnitOfWork, UnitOfWorkExt};
use crate::utils::ids::{new_id, INVESTMENT_ID_PREFIX};
use crate::utils::retry::with_conflict_retry;
use crate::utils::time_utils::{maturity_date_from, now_utc};
use crate::wallets::{lock_wallets, wallets_ops, LedgerStore, Memo, TransactionCategory};

pub struct LifecycleCoordinator {
    unit_of_work: Arc<dyn UnitOfWork>,
    event_sink: Arc<dyn DomainEventSink>,
    config: LedgerConfig,
}

impl LifecycleCoordinator {
    pub fn new(
        unit_of_work: Arc<dyn UnitOfWork>,
        event_sink: Arc<dyn DomainEventSink>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            unit_of_work,
            event_sink,
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Runs `job` in a unit of work, retrying on conflicts.
    ///
    /// With a key, a stored outcome short-circuits the job and the returned
    /// flag is `true`; otherwise the outcome is stored in the same unit of work.
    async fn run_once<T, F>(
        &self,
        operation: &'static str,
        key: Option<String>,
        job: F,
    ) -> Result<(T, bool)>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn(&mut dyn StoreTransaction) -> Result<T> + Clone + Send + Sync + 'static,
    {
        with_conflict_retry(operation, self.config.max_conflict_retries, || {
            let job = job.clone();
            let key = key.clone();
            self.unit_of_work.run(move |tx| {
                if let Some(key) = &key {
                    if let Some(record) = tx.get_idempotency_record(key)? {
                        if record.operation != operation {
                            return Err(Error::ConstraintViolation(format!(
                                "idempotency key already used for {}",
                                record.operation
                            )));
                        }
                        debug!("{} replayed from idempotency record", operation);
                        let outcome: T = serde_json::from_str(&record.outcome)?;
                        return Ok((outcome, true));
                    }
                }
                let outcome = job(tx)?;
                if let Some(key) = key {
                    tx.insert_idempotency_record(&IdempotencyRecord {
                        key,
                        operation: operation.to_string(),
                        outcome: serde_json::to_string(&outcome)?,
                        created_at: now_utc(),
                    })?;
                }
                Ok((outcome, false))
            })
        })
        .await
    }

    /// Escrows the lender's funds and records the bid and its investment.
    pub async fn place_bid(&self, cmd: PlaceBid) -> Result<BidPlacement> {
        LedgerCommand::PlaceBid(cmd.clone()).validate()?;
        let key = cmd
            .idempotency_key
            .as_deref()
            .map(|k| compute_idempotency_key("place_bid", &[&cmd.trip_id, &cmd.lender_id, k]));
        let default_maturity_days = self.config.default_maturity_days;
        let interest_basis = self.config.interest_basis;

        let (placement, replayed) = self
            .run_once("place_bid", key, move |tx| {
                let now = now_utc();
                let trip = tx.trip_for_update(&cmd.trip_id)?;
                if !trip.status.is_open_for_bids() {
                    return Err(Error::invalid_transition(trip.status, TripStatus::Escrowed));
                }
                if trip.load_owner_id == cmd.lender_id {
                    return Err(Error::ConstraintViolation(
                        "a load owner cannot bid on their own trip".to_string(),
                    ));
                }
                let has_open_bid = tx
                    .bids_for_trip(&trip.id)?
                    .iter()
                    .any(|b| b.lender_id == cmd.lender_id && b.status == BidStatus::Open);
                if has_open_bid {
                    return Err(Error::ConstraintViolation(format!(
                        "lender {} already has an open bid on trip {}",
                        cmd.lender_id, trip.id
                    )));
                }

                let escrow = wallets_ops::move_to_escrow(
                    tx,
                    &cmd.lender_id,
                    cmd.amount,
                    Some(
                        Memo::new(format!("Bid of ₹{} escrowed for trip {}", cmd.amount, trip.id))
                            .with_reference(&trip.id),
                    ),
                )?;
                let bid = trips_registry::add_bid(
                    tx,
                    NewBid {
                        trip_id: trip.id.clone(),
                        lender_id: cmd.lender_id.clone(),
                        lender_name: cmd.lender_name.clone(),
                        amount: cmd.amount,
                        interest_rate: cmd.interest_rate,
                    },
                    now,
                )?;

                let maturity_days = trip.maturity_days.unwrap_or(default_maturity_days);
                let investment = Investment {
                    id: new_id(INVESTMENT_ID_PREFIX),
                    bid_id: bid.id.clone(),
                    trip_id: trip.id.clone(),
                    lender_id: cmd.lender_id.clone(),
                    amount: cmd.amount,
                    interest_rate: cmd.interest_rate,
                    expected_return: expected_return(
                        cmd.amount,
                        cmd.interest_rate,
                        maturity_days,
                        interest_basis,
                    )?,
                    maturity_date: maturity_date_from(now, maturity_days)?,
                    status: InvestmentStatus::Escrowed,
                    created_at: now,
                    updated_at: now,
                };
                tx.insert_investment(&investment)?;

                let previous_status = trip.status;
                let trip = if previous_status == TripStatus::Pending {
                    trips_registry::transition_status(tx, &trip.id, TripStatus::Escrowed, now)?
                } else {
                    trip
                };

                Ok(BidPlacement {
                    trip,
                    bid,
                    investment,
                    lender_wallet: escrow.wallet,
                    previous_status,
                })
            })
            .await?;

        if !replayed {
            info!(
                "Bid {} of {} placed on trip {} by {}",
                placement.bid.id, placement.bid.amount, placement.trip.id, placement.bid.lender_id
            );
            let mut events = vec![DomainEvent::bid_received(
                placement.trip.id.clone(),
                placement.bid.id.clone(),
                placement.bid.lender_id.clone(),
                placement.trip.load_owner_id.clone(),
                placement.bid.amount,
            )];
            if placement.previous_status != placement.trip.status {
                events.push(DomainEvent::trip_status_changed(
                    placement.trip.id.clone(),
                    placement.previous_status,
                    placement.trip.status,
                ));
            }
            self.event_sink.emit_batch(events);
        }
        Ok(placement)
    }

    /// Accepts a bid: the lender's escrow becomes invested principal, the
    /// borrower receives the loan, and every competing bid is released.
    pub async fn accept_bid(&self, trip_id: &str, bid_id: &str) -> Result<Allotment> {
        LedgerCommand::AcceptBid {
            trip_id: trip_id.to_string(),
            bid_id: bid_id.to_string(),
        }
        .validate()?;
        let key = compute_idempotency_key("accept_bid", &[trip_id, bid_id]);
        let trip_id = trip_id.to_string();
        let bid_id = bid_id.to_string();

        let (allotment, replayed) = self
            .run_once("accept_bid", Some(key), move |tx| {
                let now = now_utc();
                let current = tx.trip_for_update(&trip_id)?;
                let bids = tx.bids_for_trip(&trip_id)?;
                let mut parties: Vec<&str> = bids
                    .iter()
                    .filter(|b| b.status == BidStatus::Open)
                    .map(|b| b.lender_id.as_str())
                    .collect();
                parties.push(current.load_owner_id.as_str());
                lock_wallets(tx, &parties)?;

                let (trip, bid) = trips_registry::accept_bid(tx, &trip_id, &bid_id, now)?;
                let memo = || Memo::new(format!("Investment in trip {}", trip.id)).with_reference(&trip.id);

                let lender = wallets_ops::escrow_to_invested(tx, &bid.lender_id, bid.amount, Some(memo()))?;
                let borrower = wallets_ops::credit(
                    tx,
                    &trip.load_owner_id,
                    bid.amount,
                    TransactionCategory::Payment,
                    Memo::new(format!("Loan disbursed for trip {}", trip.id))
                        .with_reference(&trip.id),
                )?;

                let mut investment = tx
                    .investment_for_bid(&bid.id)?
                    .ok_or_else(|| Error::not_found("Investment", format!("for bid {}", bid.id)))?;
                investment.transition(InvestmentStatus::Active, now)?;
                tx.update_investment(&investment)?;

                let mut rejected_bid_ids = Vec::new();
                for mut other in bids {
                    if other.id == bid.id || other.status != BidStatus::Open {
                        continue;
                    }
                    release_bid(tx, &mut other, BidStatus::Rejected, now)?;
                    rejected_bid_ids.push(other.id);
                }

                Ok(Allotment {
                    trip,
                    bid,
                    investment,
                    lender_wallet: lender.wallet,
                    borrower_wallet: borrower.wallet,
                    rejected_bid_ids,
                    previous_status: current.status,
                })
            })
            .await?;

        if !replayed {
            info!(
                "Trip {} allotted to {} for {}",
                allotment.trip.id, allotment.bid.lender_id, allotment.bid.amount
            );
            self.event_sink.emit_batch(vec![
                DomainEvent::investment_allotted(
                    allotment.trip.id.clone(),
                    allotment.bid.id.clone(),
                    allotment.investment.id.clone(),
                    allotment.bid.lender_id.clone(),
                    allotment.trip.load_owner_id.clone(),
                    allotment.bid.amount,
                ),
                DomainEvent::trip_status_changed(
                    allotment.trip.id.clone(),
                    allotment.previous_status,
                    allotment.trip.status,
                ),
            ]);
        }
        Ok(allotment)
    }

    /// Pulls an open bid and returns its escrow to the lender.
    pub async fn withdraw_bid(&self, trip_id: &str, bid_id: &str) -> Result<BidWithdrawal> {
        LedgerCommand::WithdrawBid {
            trip_id: trip_id.to_string(),
            bid_id: bid_id.to_string(),
        }
        .validate()?;
        let trip_id = trip_id.to_string();
        let bid_id = bid_id.to_string();

        let (withdrawal, _) = self
            .run_once("withdraw_bid", None, move |tx| {
                let now = now_utc();
                let mut bid = tx.bid_for_update(&bid_id)?;
                if bid.trip_id != trip_id {
                    return Err(Error::not_found(
                        "TripBid",
                        format!("{} on trip {}", bid_id, trip_id),
                    ));
                }
                let (wallet, investment) = release_bid(tx, &mut bid, BidStatus::Withdrawn, now)?;
                Ok(BidWithdrawal {
                    bid,
                    investment,
                    lender_wallet: wallet,
                })
            })
            .await?;

        info!("Bid {} withdrawn", withdrawal.bid.id);
        self.event_sink.emit(DomainEvent::bid_withdrawn(
            withdrawal.bid.trip_id.clone(),
            withdrawal.bid.id.clone(),
            withdrawal.bid.lender_id.clone(),
        ));
        Ok(withdrawal)
    }

    /// Settles a funded trip: the borrower pays principal and yield, the
    /// lender is repaid, the trip closes and the platform fee is collected.
    pub async fn repay(&self, trip_id: &str) -> Result<Repayment> {
        LedgerCommand::Repay {
            trip_id: trip_id.to_string(),
        }
        .validate()?;
        let key = compute_idempotency_key("repay", &[trip_id]);
        let trip_id = trip_id.to_string();
        let config = self.config.clone();

        let (repayment, replayed) = self
            .run_once("repay", Some(key), move |tx| {
                let now = now_utc();
                let mut trip = tx.trip_for_update(&trip_id)?;
                let previous_status = trip.status;
                if !matches!(
                    previous_status,
                    TripStatus::Funded | TripStatus::InTransit | TripStatus::Completed
                ) {
                    return Err(Error::invalid_transition(previous_status, TripStatus::Repaid));
                }
                let lender_id = trip.lender_id.clone().ok_or_else(|| {
                    Error::ConstraintViolation(format!("trip {} has no lender", trip.id))
                })?;
                let accepted = accepted_bid(tx, &trip.id)?;
                let mut investment = tx
                    .investment_for_bid(&accepted.id)?
                    .ok_or_else(|| Error::not_found("Investment", format!("for bid {}", accepted.id)))?;
                let principal = investment.amount;
                let yield_amount = investment.expected_return;
                let borrower_id = trip.load_owner_id.clone();
                let total_due = principal.try_add(yield_amount, "repayment total")?;

                lock_wallets(
                    tx,
                    &[&borrower_id, &lender_id, &config.platform_account_id],
                )?;

                wallets_ops::debit(
                    tx,
                    &borrower_id,
                    total_due,
                    TransactionCategory::Investment,
                    Memo::new(format!("Loan repayment for trip {}", trip.id))
                        .with_reference(&trip.id),
                )?;
                wallets_ops::return_investment(
                    tx,
                    &lender_id,
                    principal,
                    yield_amount,
                    Some(
                        Memo::new(format!(
                            "Repayment for trip {}: ₹{} principal + ₹{} interest",
                            trip.id, principal, yield_amount
                        ))
                        .with_reference(&trip.id),
                    ),
                )?;

                let path = forward_path(trip.status, TripStatus::Repaid).ok_or_else(|| {
                    Error::invalid_transition(trip.status, TripStatus::Repaid)
                })?;
                for step in path {
                    trips_registry::apply_transition(&mut trip, step, now)?;
                }
                tx.update_trip(&trip)?;

                investment.transition(InvestmentStatus::Completed, now)?;
                tx.update_investment(&investment)?;

                let platform_fee = compute_and_record(
                    tx,
                    &FeeContext {
                        trip_id: &trip.id,
                        lender_id: &lender_id,
                        borrower_id: &borrower_id,
                        loan_amount: principal,
                        fee_percentage: config.fee_percentage,
                        fee_bearer: config.fee_bearer,
                        platform_account_id: &config.platform_account_id,
                    },
                    now,
                )?;

                Ok(Repayment {
                    borrower_wallet: tx.get_or_create_wallet(&borrower_id)?,
                    lender_wallet: tx.get_or_create_wallet(&lender_id)?,
                    trip,
                    investment,
                    principal,
                    yield_amount,
                    platform_fee,
                    previous_status,
                })
            })
            .await?;

        if !replayed {
            info!(
                "Trip {} repaid: principal {}, yield {}, fee {}",
                repayment.trip.id,
                repayment.principal,
                repayment.yield_amount,
                repayment.platform_fee.fee_amount
            );
            self.event_sink.emit_batch(vec![
                DomainEvent::trip_status_changed(
                    repayment.trip.id.clone(),
                    repayment.previous_status,
                    repayment.trip.status,
                ),
                DomainEvent::trip_repaid(
                    repayment.trip.id.clone(),
                    repayment.investment.lender_id.clone(),
                    repayment.trip.load_owner_id.clone(),
                    repayment.principal,
                    repayment.yield_amount,
                    repayment.platform_fee.fee_amount,
                ),
            ]);
        }
        Ok(repayment)
    }

    /// Cancels a trip that has not completed.
    ///
    /// Open bids get their escrow back. On a funded or in-transit trip the
    /// borrower also returns the disbursed principal, the lender's invested
    /// principal goes back to balance and the investment is released.
    pub async fn cancel_trip(&self, trip_id: &str) -> Result<Cancellation> {
        LedgerCommand::CancelTrip {
            trip_id: trip_id.to_string(),
        }
        .validate()?;
        let trip_id = trip_id.to_string();

        let (cancellation, _) = self
            .run_once("cancel_trip", None, move |tx| {
                let now = now_utc();
                let mut trip = tx.trip_for_update(&trip_id)?;
                let previous_status = trip.status;
                if !can_transition(previous_status, TripStatus::Cancelled) {
                    return Err(Error::invalid_transition(
                        previous_status,
                        TripStatus::Cancelled,
                    ));
                }
                let bids = tx.bids_for_trip(&trip.id)?;
                let funded = matches!(previous_status, TripStatus::Funded | TripStatus::InTransit);
                let accepted = if funded {
                    Some(accepted_bid(tx, &trip.id)?)
                } else {
                    None
                };

                let mut parties: Vec<&str> = bids
                    .iter()
                    .filter(|b| b.status == BidStatus::Open)
                    .map(|b| b.lender_id.as_str())
                    .collect();
                if let Some(bid) = &accepted {
                    parties.push(&bid.lender_id);
                    parties.push(&trip.load_owner_id);
                }
                lock_wallets(tx, &parties)?;

                let refunded_investment = match &accepted {
                    Some(bid) => Some(unwind_loan(tx, &trip.load_owner_id, bid, now)?),
                    None => None,
                };

                let mut released_bid_ids = Vec::new();
                for mut bid in bids {
                    if bid.status != BidStatus::Open {
                        continue;
                    }
                    release_bid(tx, &mut bid, BidStatus::Rejected, now)?;
                    released_bid_ids.push(bid.id);
                }

                trips_registry::apply_transition(&mut trip, TripStatus::Cancelled, now)?;
                tx.update_trip(&trip)?;
                Ok(Cancellation {
                    trip,
                    released_bid_ids,
                    refunded_investment,
                    previous_status,
                })
            })
            .await?;

        info!(
            "Trip {} cancelled, {} bid(s) released",
            cancellation.trip.id,
            cancellation.released_bid_ids.len()
        );
        self.event_sink.emit_batch(vec![
            DomainEvent::trip_status_changed(
                cancellation.trip.id.clone(),
                cancellation.previous_status,
                cancellation.trip.status,
            ),
            DomainEvent::trip_cancelled(
                cancellation.trip.id.clone(),
                cancellation.released_bid_ids.clone(),
            ),
        ]);
        Ok(cancellation)
    }

    /// Marks an active investment whose maturity date has passed as defaulted.
    /// No money moves.
    pub async fn mark_defaulted(
        &self,
        investment_id: &str,
        now: NaiveDateTime,
    ) -> Result<Investment> {
        LedgerCommand::MarkDefaulted {
            investment_id: investment_id.to_string(),
            as_of: Some(now),
        }
        .validate()?;
        let investment_id = investment_id.to_string();

        let (investment, _) = self
            .run_once("mark_defaulted", None, move |tx| {
                let mut investment = tx.investment_for_update(&investment_id)?;
                if investment.status != InvestmentStatus::Active {
                    return Err(Error::invalid_transition(
                        investment.status,
                        InvestmentStatus::Defaulted,
                    ));
                }
                if !investment.is_overdue(now) {
                    return Err(Error::ConstraintViolation(format!(
                        "investment {} matures at {}",
                        investment.id, investment.maturity_date
                    )));
                }
                investment.transition(InvestmentStatus::Defaulted, now)?;
                tx.update_investment(&investment)?;
                Ok(investment)
            })
            .await?;

        info!("Investment {} defaulted", investment.id);
        self.event_sink.emit(DomainEvent::investment_defaulted(
            investment.id.clone(),
            investment.trip_id.clone(),
            investment.lender_id.clone(),
        ));
        Ok(investment)
    }

    /// Validates and dispatches a tagged command.
    pub async fn execute(&self, command: LedgerCommand) -> Result<CommandOutcome> {
        command.validate()?;
        debug!("Executing {}", command.name());
        match command {
            LedgerCommand::PlaceBid(cmd) => self.place_bid(cmd).await.map(CommandOutcome::BidPlaced),
            LedgerCommand::AcceptBid { trip_id, bid_id } => self
                .accept_bid(&trip_id, &bid_id)
                .await
                .map(CommandOutcome::BidAccepted),
            LedgerCommand::WithdrawBid { trip_id, bid_id } => self
                .withdraw_bid(&trip_id, &bid_id)
                .await
                .map(CommandOutcome::BidWithdrawn),
            LedgerCommand::Repay { trip_id } => {
                self.repay(&trip_id).await.map(CommandOutcome::Repaid)
            }
            LedgerCommand::CancelTrip { trip_id } => self
                .cancel_trip(&trip_id)
                .await
                .map(CommandOutcome::TripCancelled),
            LedgerCommand::MarkDefaulted {
                investment_id,
                as_of,
            } => self
                .mark_defaulted(&investment_id, as_of.unwrap_or_else(now_utc))
                .await
                .map(CommandOutcome::InvestmentDefaulted),
        }
    }
}

fn accepted_bid<S: TripStore + ?Sized>(store: &mut S, trip_id: &str) -> Result<TripBid> {
    store
        .bids_for_trip(trip_id)?
        .into_iter()
        .find(|b| b.status == BidStatus::Accepted)
        .ok_or_else(|| Error::not_found("TripBid", format!("accepted bid of trip {}", trip_id)))
}

/// Reverses the disbursement of an accepted bid: the borrower pays the
/// principal back and the lender's invested principal returns to balance.
fn unwind_loan<S>(
    store: &mut S,
    borrower_id: &str,
    bid: &TripBid,
    now: NaiveDateTime,
) -> Result<Investment>
where
    S: LedgerStore + TripStore + InvestmentStore + ?Sized,
{
    let mut investment = store
        .investment_for_bid(&bid.id)?
        .ok_or_else(|| Error::not_found("Investment", format!("for bid {}", bid.id)))?;
    wallets_ops::debit(
        store,
        borrower_id,
        investment.amount,
        TransactionCategory::Refund,
        Memo::new(format!("Loan returned for cancelled trip {}", bid.trip_id))
            .with_reference(&bid.trip_id),
    )?;
    wallets_ops::unwind_investment(
        store,
        &bid.lender_id,
        investment.amount,
        Some(
            Memo::new(format!("Investment unwound for cancelled trip {}", bid.trip_id))
                .with_reference(&bid.trip_id),
        ),
    )?;
    investment.transition(InvestmentStatus::Released, now)?;
    store.update_investment(&investment)?;
    Ok(investment)
}

/// Closes an open bid, returns its escrow and releases its investment.
fn release_bid<S>(
    store: &mut S,
    bid: &mut TripBid,
    status: BidStatus,
    now: NaiveDateTime,
) -> Result<(crate::wallets::Wallet, Option<Investment>)>
where
    S: LedgerStore + TripStore + InvestmentStore + ?Sized,
{
    trips_registry::close_bid(store, bid, status, now)?;
    let entry = wallets_ops::release_escrow(
        store,
        &bid.lender_id,
        bid.amount,
        Some(
            Memo::new(format!("Escrow released for bid {} ({})", bid.id, status))
                .with_reference(&bid.trip_id),
        ),
    )?;
    let investment = match store.investment_for_bid(&bid.id)? {
        Some(mut investment) => {
            investment.transition(InvestmentStatus::Released, now)?;
            store.update_investment(&investment)?;
            Some(investment)
        }
        None => None,
    };
    Ok((entry.wallet, investment))
}
