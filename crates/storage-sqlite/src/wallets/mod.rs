//! SQLite storage for wallets and the append-only transaction log.

mod model;
mod repository;
mod store;

pub use model::{TransactionDB, WalletChangesetDB, WalletDB};
pub use repository::LedgerRepository;
