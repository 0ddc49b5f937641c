use std::sync::Arc;

use chrono::Duration;
use rust_decimal_macros::dec;

use super::*;
use crate::config::LedgerConfig;
use crate::errors::Error;
use crate::events::{DomainEvent, MockDomainEventSink};
use crate::investments::{Investment, InvestmentStatus};
use crate::money::Money;
use crate::testing::MemoryUnitOfWork;
use crate::trips::{trips_registry, BidStatus, NewTrip, TripStatus};
use crate::utils::time_utils::now_utc;
use crate::wallets::{wallets_ops, Memo, TransactionCategory, WalletField};

const OWNER: &str = "owner-1";
const LENDER: &str = "lender-1";
const OTHER_LENDER: &str = "lender-2";

struct Harness {
    uow: Arc<MemoryUnitOfWork>,
    sink: MockDomainEventSink,
    coordinator: LifecycleCoordinator,
}

fn harness() -> Harness {
    let uow = Arc::new(MemoryUnitOfWork::new());
    let sink = MockDomainEventSink::new();
    let coordinator =
        LifecycleCoordinator::new(uow.clone(), Arc::new(sink.clone()), LedgerConfig::default());
    Harness {
        uow,
        sink,
        coordinator,
    }
}

impl Harness {
    fn deposit(&self, user_id: &str, minor: i64) {
        self.uow.with_state(|s| {
            wallets_ops::credit(
                s,
                user_id,
                Money::from_minor(minor),
                TransactionCategory::Payment,
                Memo::new("Deposit"),
            )
            .unwrap();
        });
    }

    fn trip(&self, amount: i64) -> String {
        self.uow.with_state(|s| {
            trips_registry::create_trip(
                s,
                NewTrip {
                    load_owner_id: OWNER.to_string(),
                    load_owner_name: Some("Acme Logistics".to_string()),
                    origin: "Mumbai".to_string(),
                    destination: "Delhi".to_string(),
                    load_type: Some("FMCG".to_string()),
                    amount: Money::from_minor(amount),
                    interest_rate: None,
                    maturity_days: Some(30),
                    risk_level: None,
                    insurance_status: false,
                },
                now_utc(),
            )
            .unwrap()
            .id
        })
    }

    fn balance(&self, user_id: &str, field: WalletField) -> Money {
        self.uow
            .snapshot()
            .wallets
            .get(user_id)
            .map(|w| w.amount(field))
            .unwrap_or(Money::ZERO)
    }
}

fn bid(trip_id: &str, lender_id: &str, minor: i64) -> PlaceBid {
    PlaceBid {
        trip_id: trip_id.to_string(),
        lender_id: lender_id.to_string(),
        lender_name: None,
        amount: Money::from_minor(minor),
        interest_rate: dec!(10),
        idempotency_key: None,
    }
}

#[tokio::test]
async fn place_bid_escrows_funds_and_records_investment() {
    let h = harness();
    h.deposit(LENDER, 1_000_000);
    let trip_id = h.trip(400_000);

    let placement = h.coordinator.place_bid(bid(&trip_id, LENDER, 400_000)).await.unwrap();

    assert_eq!(placement.trip.status, TripStatus::Escrowed);
    assert_eq!(placement.bid.status, BidStatus::Open);
    assert_eq!(placement.investment.status, InvestmentStatus::Escrowed);
    assert_eq!(placement.investment.expected_return, Money::from_minor(40_000));
    assert_eq!(placement.lender_wallet.balance, Money::from_minor(600_000));
    assert_eq!(placement.lender_wallet.escrowed_amount, Money::from_minor(400_000));

    let events = h.sink.events();
    assert!(matches!(events[0], DomainEvent::BidReceived { .. }));
    assert!(matches!(
        events[1],
        DomainEvent::TripStatusChanged {
            to: TripStatus::Escrowed,
            ..
        }
    ));
}

#[tokio::test]
async fn place_bid_without_funds_changes_nothing() {
    let h = harness();
    h.deposit(LENDER, 1_000);
    let trip_id = h.trip(400_000);
    let before = h.uow.snapshot();

    let err = h
        .coordinator
        .place_bid(bid(&trip_id, LENDER, 400_000))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InsufficientFunds { .. }));
    let after = h.uow.snapshot();
    assert_eq!(after.bids.len(), before.bids.len());
    assert_eq!(after.investments.len(), 0);
    assert_eq!(after.trips[&trip_id].status, TripStatus::Pending);
    assert!(h.sink.is_empty());
}

#[tokio::test]
async fn owner_cannot_bid_and_lender_cannot_bid_twice() {
    let h = harness();
    h.deposit(OWNER, 500_000);
    h.deposit(LENDER, 500_000);
    let trip_id = h.trip(100_000);

    let err = h
        .coordinator
        .place_bid(bid(&trip_id, OWNER, 100_000))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));

    h.coordinator.place_bid(bid(&trip_id, LENDER, 100_000)).await.unwrap();
    let err = h
        .coordinator
        .place_bid(bid(&trip_id, LENDER, 100_000))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));
    assert_eq!(h.balance(LENDER, WalletField::EscrowedAmount), Money::from_minor(100_000));
}

#[tokio::test]
async fn place_bid_with_key_applies_once() {
    let h = harness();
    h.deposit(LENDER, 500_000);
    let trip_id = h.trip(100_000);
    let mut cmd = bid(&trip_id, LENDER, 100_000);
    cmd.idempotency_key = Some("client-retry-1".to_string());

    let first = h.coordinator.place_bid(cmd.clone()).await.unwrap();
    h.sink.clear();
    let second = h.coordinator.place_bid(cmd).await.unwrap();

    assert_eq!(first, second);
    assert!(h.sink.is_empty());
    assert_eq!(h.uow.snapshot().bids.len(), 1);
    assert_eq!(h.balance(LENDER, WalletField::Balance), Money::from_minor(400_000));
}

#[tokio::test]
async fn accept_bid_invests_disburses_and_releases_competitors() {
    let h = harness();
    h.deposit(LENDER, 500_000);
    h.deposit(OTHER_LENDER, 500_000);
    let trip_id = h.trip(400_000);
    let winner = h.coordinator.place_bid(bid(&trip_id, LENDER, 400_000)).await.unwrap();
    let loser = h
        .coordinator
        .place_bid(bid(&trip_id, OTHER_LENDER, 350_000))
        .await
        .unwrap();

    let allotment = h
        .coordinator
        .accept_bid(&trip_id, &winner.bid.id)
        .await
        .unwrap();

    assert_eq!(allotment.trip.status, TripStatus::Funded);
    assert_eq!(allotment.trip.lender_id.as_deref(), Some(LENDER));
    assert_eq!(allotment.investment.status, InvestmentStatus::Active);
    assert_eq!(allotment.lender_wallet.total_invested, Money::from_minor(400_000));
    assert_eq!(allotment.lender_wallet.escrowed_amount, Money::ZERO);
    assert_eq!(allotment.borrower_wallet.balance, Money::from_minor(400_000));
    assert_eq!(allotment.rejected_bid_ids, vec![loser.bid.id.clone()]);

    assert_eq!(h.balance(OTHER_LENDER, WalletField::Balance), Money::from_minor(500_000));
    assert_eq!(h.balance(OTHER_LENDER, WalletField::EscrowedAmount), Money::ZERO);
    let state = h.uow.snapshot();
    assert_eq!(
        state.investments[&loser.investment.id].status,
        InvestmentStatus::Released
    );
}

#[tokio::test]
async fn accepting_twice_replays_the_first_outcome() {
    let h = harness();
    h.deposit(LENDER, 500_000);
    let trip_id = h.trip(400_000);
    let placed = h.coordinator.place_bid(bid(&trip_id, LENDER, 400_000)).await.unwrap();

    let first = h.coordinator.accept_bid(&trip_id, &placed.bid.id).await.unwrap();
    h.sink.clear();
    let second = h.coordinator.accept_bid(&trip_id, &placed.bid.id).await.unwrap();

    assert_eq!(first, second);
    assert!(h.sink.is_empty());
    assert_eq!(h.balance(OWNER, WalletField::Balance), Money::from_minor(400_000));
}

#[tokio::test]
async fn repay_settles_lender_borrower_and_platform_atomically() {
    let h = harness();
    h.deposit(LENDER, 400_000);
    let trip_id = h.trip(400_000);
    let placed = h.coordinator.place_bid(bid(&trip_id, LENDER, 400_000)).await.unwrap();
    h.coordinator.accept_bid(&trip_id, &placed.bid.id).await.unwrap();
    // borrower needs yield (40,000) and fee (2,000) on top of the disbursed loan
    h.deposit(OWNER, 42_000);

    let repayment = h.coordinator.repay(&trip_id).await.unwrap();

    assert_eq!(repayment.trip.status, TripStatus::Repaid);
    assert!(repayment.trip.completed_at.is_some());
    assert_eq!(repayment.investment.status, InvestmentStatus::Completed);
    assert_eq!(repayment.principal, Money::from_minor(400_000));
    assert_eq!(repayment.yield_amount, Money::from_minor(40_000));
    assert_eq!(repayment.platform_fee.fee_amount, Money::from_minor(2_000));
    assert_eq!(repayment.borrower_wallet.balance, Money::ZERO);
    assert_eq!(repayment.lender_wallet.balance, Money::from_minor(440_000));
    assert_eq!(repayment.lender_wallet.total_invested, Money::ZERO);
    assert_eq!(repayment.lender_wallet.total_returns, Money::from_minor(40_000));
    assert_eq!(h.balance("platform", WalletField::Balance), Money::from_minor(2_000));

    let state = h.uow.snapshot();
    assert_eq!(state.fees.len(), 1);
    assert!(state.fees[0].platform_transaction_id.is_some());
    assert!(h.sink.events().iter().any(|e| matches!(e, DomainEvent::TripRepaid { .. })));
}

#[tokio::test]
async fn repay_failure_midway_rolls_everything_back() {
    let h = harness();
    h.deposit(LENDER, 400_000);
    let trip_id = h.trip(400_000);
    let placed = h.coordinator.place_bid(bid(&trip_id, LENDER, 400_000)).await.unwrap();
    h.coordinator.accept_bid(&trip_id, &placed.bid.id).await.unwrap();
    h.deposit(OWNER, 42_000);
    let before = h.uow.snapshot();

    // allow the borrower debit, fail the lender credit
    h.uow.with_state(|s| s.apply_budget = Some(1));
    let err = h.coordinator.repay(&trip_id).await.unwrap_err();
    assert!(matches!(err, Error::Database(_)));

    let after = h.uow.snapshot();
    assert_eq!(after.wallets[OWNER], before.wallets[OWNER]);
    assert_eq!(after.transactions.len(), before.transactions.len());
    assert_eq!(after.trips[&trip_id].status, TripStatus::Funded);
    assert!(after.fees.is_empty());
}

#[tokio::test]
async fn repay_requires_a_funded_trip() {
    let h = harness();
    let trip_id = h.trip(400_000);
    let err = h.coordinator.repay(&trip_id).await.unwrap_err();
    match err {
        Error::InvalidTransition { from, to } => {
            assert_eq!(from, "pending");
            assert_eq!(to, "repaid");
        }
        other => panic!("expected InvalidTransition, got {:?}", other),
    }
}

#[tokio::test]
async fn withdraw_and_cancel_release_escrow() {
    let h = harness();
    h.deposit(LENDER, 300_000);
    h.deposit(OTHER_LENDER, 300_000);
    let trip_id = h.trip(200_000);
    let a = h.coordinator.place_bid(bid(&trip_id, LENDER, 200_000)).await.unwrap();
    h.coordinator
        .place_bid(bid(&trip_id, OTHER_LENDER, 150_000))
        .await
        .unwrap();

    let withdrawal = h.coordinator.withdraw_bid(&trip_id, &a.bid.id).await.unwrap();
    assert_eq!(withdrawal.bid.status, BidStatus::Withdrawn);
    assert_eq!(withdrawal.lender_wallet.balance, Money::from_minor(300_000));

    let cancellation = h.coordinator.cancel_trip(&trip_id).await.unwrap();
    assert_eq!(cancellation.trip.status, TripStatus::Cancelled);
    assert_eq!(cancellation.released_bid_ids.len(), 1);
    assert_eq!(h.balance(OTHER_LENDER, WalletField::Balance), Money::from_minor(300_000));
    assert_eq!(h.balance(OTHER_LENDER, WalletField::EscrowedAmount), Money::ZERO);

    let err = h
        .coordinator
        .place_bid(bid(&trip_id, LENDER, 10_000))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
}

#[tokio::test]
async fn mark_defaulted_only_after_maturity() {
    let h = harness();
    h.deposit(LENDER, 400_000);
    let trip_id = h.trip(400_000);
    let placed = h.coordinator.place_bid(bid(&trip_id, LENDER, 400_000)).await.unwrap();
    let allotment = h.coordinator.accept_bid(&trip_id, &placed.bid.id).await.unwrap();
    let investment_id = allotment.investment.id.clone();

    let early = h
        .coordinator
        .mark_defaulted(&investment_id, now_utc())
        .await
        .unwrap_err();
    assert!(matches!(early, Error::ConstraintViolation(_)));

    let later = allotment.investment.maturity_date + Duration::days(1);
    let defaulted = h
        .coordinator
        .mark_defaulted(&investment_id, later)
        .await
        .unwrap();
    assert_eq!(defaulted.status, InvestmentStatus::Defaulted);
    assert_eq!(h.balance(LENDER, WalletField::TotalInvested), Money::from_minor(400_000));
}

#[tokio::test]
async fn execute_dispatches_tagged_commands() {
    let h = harness();
    h.deposit(LENDER, 100_000);
    let trip_id = h.trip(50_000);

    let outcome = h
        .coordinator
        .execute(LedgerCommand::PlaceBid(bid(&trip_id, LENDER, 50_000)))
        .await
        .unwrap();
    let bid_id = match outcome {
        CommandOutcome::BidPlaced(p) => p.bid.id,
        other => panic!("unexpected {:?}", other),
    };

    let outcome = h
        .coordinator
        .execute(LedgerCommand::AcceptBid {
            trip_id: trip_id.clone(),
            bid_id,
        })
        .await
        .unwrap();
    assert!(matches!(outcome, CommandOutcome::BidAccepted(_)));

    let invalid = h
        .coordinator
        .execute(LedgerCommand::Repay {
            trip_id: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(invalid, Error::Validation(_)));
}

async fn funded_trip(h: &Harness, amount: i64) -> (String, Investment) {
    h.deposit(LENDER, amount);
    let trip_id = h.trip(amount);
    let placed = h.coordinator.place_bid(bid(&trip_id, LENDER, amount)).await.unwrap();
    let allotment = h.coordinator.accept_bid(&trip_id, &placed.bid.id).await.unwrap();
    (trip_id, allotment.investment)
}

#[tokio::test]
async fn cancelling_a_funded_trip_unwinds_the_loan() {
    let h = harness();
    let (trip_id, investment) = funded_trip(&h, 400_000).await;
    assert_eq!(h.balance(OWNER, WalletField::Balance), Money::from_minor(400_000));

    let cancellation = h.coordinator.cancel_trip(&trip_id).await.unwrap();

    assert_eq!(cancellation.previous_status, TripStatus::Funded);
    assert_eq!(cancellation.trip.status, TripStatus::Cancelled);
    let refunded = cancellation.refunded_investment.unwrap();
    assert_eq!(refunded.id, investment.id);
    assert_eq!(refunded.status, InvestmentStatus::Released);
    assert_eq!(h.balance(OWNER, WalletField::Balance), Money::ZERO);
    assert_eq!(h.balance(LENDER, WalletField::Balance), Money::from_minor(400_000));
    assert_eq!(h.balance(LENDER, WalletField::TotalInvested), Money::ZERO);
    assert_eq!(
        h.uow.snapshot().investments[&investment.id].status,
        InvestmentStatus::Released
    );
    assert!(h
        .sink
        .events()
        .iter()
        .any(|e| matches!(e, DomainEvent::TripCancelled { .. })));
}

#[tokio::test]
async fn cancelling_an_in_transit_trip_unwinds_the_loan() {
    let h = harness();
    let (trip_id, investment) = funded_trip(&h, 250_000).await;
    h.uow.with_state(|s| {
        trips_registry::transition_status(s, &trip_id, TripStatus::InTransit, now_utc()).unwrap();
    });

    let cancellation = h.coordinator.cancel_trip(&trip_id).await.unwrap();

    assert_eq!(cancellation.previous_status, TripStatus::InTransit);
    assert_eq!(cancellation.trip.status, TripStatus::Cancelled);
    assert_eq!(h.balance(OWNER, WalletField::Balance), Money::ZERO);
    assert_eq!(h.balance(LENDER, WalletField::Balance), Money::from_minor(250_000));
    assert_eq!(h.balance(LENDER, WalletField::TotalInvested), Money::ZERO);
    assert_eq!(
        h.uow.snapshot().investments[&investment.id].status,
        InvestmentStatus::Released
    );
}

#[tokio::test]
async fn cancelling_a_funded_trip_needs_the_disbursement_back() {
    let h = harness();
    let (trip_id, _) = funded_trip(&h, 400_000).await;
    h.uow.with_state(|s| {
        wallets_ops::debit(
            s,
            OWNER,
            Money::from_minor(300_000),
            TransactionCategory::Payment,
            Memo::new("Fuel"),
        )
        .unwrap();
    });
    let before = h.uow.snapshot();

    let err = h.coordinator.cancel_trip(&trip_id).await.unwrap_err();

    assert!(matches!(err, Error::InsufficientFunds { .. }));
    let after = h.uow.snapshot();
    assert_eq!(after.trips[&trip_id].status, TripStatus::Funded);
    assert_eq!(after.wallets, before.wallets);
    assert_eq!(after.transactions.len(), before.transactions.len());
}

#[tokio::test]
async fn completed_trips_cannot_be_cancelled() {
    let h = harness();
    let (trip_id, _) = funded_trip(&h, 100_000).await;
    h.uow.with_state(|s| {
        for step in [TripStatus::InTransit, TripStatus::Completed] {
            trips_registry::transition_status(s, &trip_id, step, now_utc()).unwrap();
        }
    });

    let err = h.coordinator.cancel_trip(&trip_id).await.unwrap_err();
    match err {
        Error::InvalidTransition { from, to } => {
            assert_eq!(from, "completed");
            assert_eq!(to, "cancelled");
        }
        other => panic!("expected InvalidTransition, got {:?}", other),
    }
}

#[tokio::test]
async fn completed_trips_do_not_move_back_to_pending() {
    let h = harness();
    let (trip_id, _) = funded_trip(&h, 100_000).await;
    h.uow.with_state(|s| {
        for step in [TripStatus::InTransit, TripStatus::Completed] {
            trips_registry::transition_status(s, &trip_id, step, now_utc()).unwrap();
        }
    });

    let err = h
        .uow
        .with_state(|s| {
            trips_registry::transition_status(s, &trip_id, TripStatus::Pending, now_utc())
        })
        .unwrap_err();

    match err {
        Error::InvalidTransition { from, to } => {
            assert_eq!(from, "completed");
            assert_eq!(to, "pending");
        }
        other => panic!("expected InvalidTransition, got {:?}", other),
    }
    assert_eq!(h.uow.snapshot().trips[&trip_id].status, TripStatus::Completed);
}

#[tokio::test]
async fn repayment_total_beyond_money_range_is_rejected() {
    let h = harness();
    let amount = 9_000_000_000_000_000_000;
    h.deposit(LENDER, amount);
    let trip_id = h.trip(amount);
    let mut big_bid = bid(&trip_id, LENDER, amount);
    big_bid.interest_rate = dec!(100);
    let placed = h.coordinator.place_bid(big_bid).await.unwrap();
    h.coordinator.accept_bid(&trip_id, &placed.bid.id).await.unwrap();
    let before = h.uow.snapshot();

    let err = h.coordinator.repay(&trip_id).await.unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    let after = h.uow.snapshot();
    assert_eq!(after.wallets, before.wallets);
    assert_eq!(after.trips[&trip_id].status, TripStatus::Funded);
}

#[tokio::test]
async fn trips_with_unbounded_maturity_are_rejected() {
    let h = harness();
    let err = h
        .uow
        .with_state(|s| {
            trips_registry::create_trip(
                s,
                NewTrip {
                    load_owner_id: OWNER.to_string(),
                    load_owner_name: None,
                    origin: "Pune".to_string(),
                    destination: "Chennai".to_string(),
                    load_type: None,
                    amount: Money::from_minor(100_000),
                    interest_rate: None,
                    maturity_days: Some(i32::MAX),
                    risk_level: None,
                    insurance_status: false,
                },
                now_utc(),
            )
        })
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(h.uow.snapshot().trips.is_empty());
}

#[tokio::test]
async fn bidding_on_a_stored_trip_with_runaway_maturity_fails_cleanly() {
    let h = harness();
    h.deposit(LENDER, 100_000);
    let trip_id = h.trip(100_000);
    h.uow.with_state(|s| {
        s.trips.get_mut(&trip_id).unwrap().maturity_days = Some(i32::MAX);
    });

    let err = h
        .coordinator
        .place_bid(bid(&trip_id, LENDER, 100_000))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(h.balance(LENDER, WalletField::Balance), Money::from_minor(100_000));
    assert!(h.uow.snapshot().investments.is_empty());
}
