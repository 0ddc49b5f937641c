//! Freightfin Core - wallet ledger and investment lifecycle.
//!
//! This crate contains the business rules of the invoice-financing ledger:
//! wallets and their append-only transaction log, trips and bids, investments,
//! platform fees and the coordinator that moves money between them. It is
//! database-agnostic and defines store traits that are implemented by the
//! `storage-sqlite` crate.

pub mod config;
pub mod errors;
pub mod events;
pub mod fees;
pub mod investments;
pub mod lifecycle;
pub mod money;
pub mod trips;
pub mod unit_of_work;
pub mod utils;
pub mod wallets;

#[cfg(test)]
pub(crate) mod testing;

pub use config::LedgerConfig;
pub use money::Money;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
