//! Investment lifecycle - bid, allotment, repayment, cancellation and default,
//! each as one atomic unit of work.

mod commands;
mod coordinator;
mod idempotency;

#[cfg(test)]
mod coordinator_tests;

pub use commands::{
    Allotment, BidPlacement, BidWithdrawal, Cancellation, CommandOutcome, LedgerCommand,
    PlaceBid, Repayment,
};
pub use coordinator::LifecycleCoordinator;
pub use idempotency::{compute_idempotency_key, IdempotencyRecord, IdempotencyStore};
