//! Property-based integration tests for the wallet ledger.
//!
//! Random sequences of wallet operations are replayed against a minimal
//! in-memory `LedgerStore`; every committed state must keep all buckets
//! non-negative and the transaction log consistent with the balance.

use std::collections::HashMap;

use proptest::prelude::*;

use freightfin_core::errors::{Error, Result};
use freightfin_core::utils::time_utils::now_utc;
use freightfin_core::wallets::{
    wallets_ops, LedgerEntry, LedgerStore, Memo, Transaction, TransactionCategory,
    TransactionDraft, TransactionType, Wallet, WalletDelta, WalletField,
};
use freightfin_core::Money;

// =============================================================================
// Store
// =============================================================================

#[derive(Default)]
struct VecLedger {
    wallets: HashMap<String, Wallet>,
    log: Vec<Transaction>,
}

impl LedgerStore for VecLedger {
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
        let current = self.get_or_create_wallet(user_id)?;
        let entry = LedgerEntry::plan(&current, delta, draft, now_utc())?;
        self.wallets.insert(user_id.to_string(), entry.wallet.clone());
        self.log.push(entry.transaction.clone());
        Ok(entry)
    }
}

// =============================================================================
// Generators
// =============================================================================

#[derive(Debug, Clone)]
enum Op {
    Credit(i64),
    Debit(i64),
    Escrow(i64),
    Invest(i64),
    Release(i64),
    Return(i64, i64),
    Lock(i64),
    Settle(i64),
    Unlock(i64),
}

fn arb_amount() -> impl Strategy<Value = i64> {
    1i64..50_000
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        arb_amount().prop_map(Op::Credit),
        arb_amount().prop_map(Op::Debit),
        arb_amount().prop_map(Op::Escrow),
        arb_amount().prop_map(Op::Invest),
        arb_amount().prop_map(Op::Release),
        (arb_amount(), 0i64..5_000).prop_map(|(p, y)| Op::Return(p, y)),
        arb_amount().prop_map(Op::Lock),
        arb_amount().prop_map(Op::Settle),
        arb_amount().prop_map(Op::Unlock),
    ]
}

fn run(store: &mut VecLedger, user: &str, op: &Op) -> Result<LedgerEntry> {
    let m = Money::from_minor;
    match *op {
        Op::Credit(a) => wallets_ops::credit(
            store,
            user,
            m(a),
            TransactionCategory::Payment,
            Memo::new("deposit"),
        ),
        Op::Debit(a) => wallets_ops::debit(
            store,
            user,
            m(a),
            TransactionCategory::Payment,
            Memo::new("payment"),
        ),
        Op::Escrow(a) => wallets_ops::move_to_escrow(store, user, m(a), None),
        Op::Invest(a) => wallets_ops::escrow_to_invested(store, user, m(a), None),
        Op::Release(a) => wallets_ops::release_escrow(store, user, m(a), None),
        Op::Return(p, y) => wallets_ops::return_investment(store, user, m(p), m(y), None),
        Op::Lock(a) => wallets_ops::lock_for_withdrawal(store, user, m(a)),
        Op::Settle(a) => wallets_ops::settle_withdrawal(store, user, m(a)),
        Op::Unlock(a) => wallets_ops::release_withdrawal(store, user, m(a)),
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// No committed state ever has a negative bucket, and a rejected
    /// operation leaves both wallet and log untouched.
    #[test]
    fn prop_buckets_never_go_negative(ops in prop::collection::vec(arb_op(), 1..60)) {
        let mut store = VecLedger::default();
        for op in &ops {
            let before = store.get_or_create_wallet("u").unwrap();
            let log_len = store.log.len();
            match run(&mut store, "u", op) {
                Ok(entry) => {
                    for field in WalletField::ALL {
                        prop_assert!(!entry.wallet.amount(field).is_negative(), "{} negative", field);
                    }
                }
                Err(Error::InsufficientFunds { .. }) => {
                    prop_assert_eq!(&store.wallets["u"], &before);
                    prop_assert_eq!(store.log.len(), log_len);
                }
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
        }
    }

    /// sum(credits) - sum(debits) equals the balance change, and the last
    /// entry's balance_after is the current balance.
    #[test]
    fn prop_log_reconstructs_balance(
        initial in 0i64..100_000,
        ops in prop::collection::vec(arb_op(), 1..60),
    ) {
        let mut store = VecLedger::default();
        if initial > 0 {
            run(&mut store, "u", &Op::Credit(initial)).unwrap();
        }
        let start_balance = store.get_or_create_wallet("u").unwrap().balance;
        let start_len = store.log.len();
        for op in &ops {
            let _ = run(&mut store, "u", op);
        }

        let wallet = store.get_or_create_wallet("u").unwrap();
        let net: i64 = store.log[start_len..]
            .iter()
            .map(|t| match t.txn_type {
                TransactionType::Credit => t.amount.minor(),
                TransactionType::Debit => -t.amount.minor(),
                TransactionType::Transfer => 0,
            })
            .sum();
        prop_assert_eq!(net, wallet.balance.minor() - start_balance.minor());
        if let Some(last) = store.log.last() {
            prop_assert_eq!(last.balance_after, wallet.balance);
            prop_assert_eq!(last.sequence, wallet.version);
        }
    }

    /// Escrowing and immediately releasing the same amount restores the
    /// balance and escrow exactly.
    #[test]
    fn prop_escrow_round_trip(initial in 1i64..1_000_000, fraction in 1i64..=100) {
        let mut store = VecLedger::default();
        run(&mut store, "u", &Op::Credit(initial)).unwrap();
        let before = store.get_or_create_wallet("u").unwrap();
        let amount = (initial * fraction / 100).max(1);

        run(&mut store, "u", &Op::Escrow(amount)).unwrap();
        let after = run(&mut store, "u", &Op::Release(amount)).unwrap().wallet;

        prop_assert_eq!(after.balance, before.balance);
        prop_assert_eq!(after.escrowed_amount, before.escrowed_amount);
    }
}
