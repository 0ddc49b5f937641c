//! SQLite storage implementation for the Freightfin ledger.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the store and repository traits defined in `freightfin-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The single-writer unit of work every money movement runs in
//! - Read repositories for wallets, trips, investments and platform fees
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The `core` crate is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod unit_of_work;
pub mod utils;

// Store and repository implementations
pub mod fees;
pub mod idempotency;
pub mod investments;
pub mod trips;
pub mod wallets;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use fees::PlatformFeeRepository;
pub use investments::InvestmentRepository;
pub use trips::TripRepository;
pub use unit_of_work::{SqliteStoreTransaction, SqliteUnitOfWork};
pub use wallets::LedgerRepository;

// Re-export from freightfin-core for convenience
pub use freightfin_core::errors::{DatabaseError, Error, Result};
