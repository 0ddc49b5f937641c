//! Wallets module - ledger models, store contract, wallet operations and service.

mod wallets_model;
pub mod wallets_ops;
mod wallets_service;
mod wallets_traits;

#[cfg(test)]
mod wallets_model_tests;

pub use wallets_model::{
    LedgerEntry, Memo, SumBy, Transaction, TransactionCategory, TransactionDraft,
    TransactionFilter, TransactionType, Wallet, WalletDelta, WalletField,
};
pub use wallets_ops::lock_wallets;
pub use wallets_service::WalletService;
pub use wallets_traits::{LedgerRepositoryTrait, LedgerStore, WalletServiceTrait};
