use chrono::NaiveDate;

use super::*;
use crate::errors::Error;
use crate::money::Money;

fn ts() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn wallet_with_balance(minor: i64) -> Wallet {
    let mut w = Wallet::empty("lender-1", ts());
    w.balance = Money::from_minor(minor);
    w
}

#[test]
fn apply_moves_funds_between_buckets_and_bumps_version() {
    let wallet = wallet_with_balance(10_000);
    let delta = WalletDelta {
        balance: Money::from_minor(-4_000),
        escrowed: Money::from_minor(4_000),
        ..WalletDelta::default()
    };
    let next = delta.apply_to(&wallet, ts()).unwrap();
    assert_eq!(next.balance, Money::from_minor(6_000));
    assert_eq!(next.escrowed_amount, Money::from_minor(4_000));
    assert_eq!(next.version, 1);
}

#[test]
fn apply_names_the_bucket_that_would_go_negative() {
    let wallet = wallet_with_balance(10_000);
    let delta = WalletDelta {
        escrowed: Money::from_minor(-1),
        ..WalletDelta::default()
    };
    match delta.apply_to(&wallet, ts()) {
        Err(Error::InsufficientFunds {
            field,
            required,
            available,
        }) => {
            assert_eq!(field, WalletField::EscrowedAmount);
            assert_eq!(required, Money::from_minor(1));
            assert_eq!(available, Money::ZERO);
        }
        other => panic!("expected InsufficientFunds, got {:?}", other),
    }
}

#[test]
fn draft_type_must_match_balance_movement() {
    let delta = WalletDelta::default().with(WalletField::Balance, Money::from_minor(500));
    let credit = TransactionDraft::new(
        TransactionType::Credit,
        TransactionCategory::Payment,
        Money::from_minor(500),
        Memo::new("top up"),
    );
    assert!(credit.validate_against(&delta).is_ok());

    let debit = TransactionDraft {
        txn_type: TransactionType::Debit,
        ..credit.clone()
    };
    assert!(debit.validate_against(&delta).is_err());

    let transfer = TransactionDraft {
        txn_type: TransactionType::Transfer,
        ..credit
    };
    assert!(transfer.validate_against(&delta).is_err());
}

#[test]
fn draft_rejects_empty_description_and_zero_amount() {
    let delta = WalletDelta::default();
    let empty = TransactionDraft::new(
        TransactionType::Transfer,
        TransactionCategory::Investment,
        Money::from_minor(100),
        Memo::new("  "),
    );
    assert!(empty.validate_against(&delta).is_err());

    let zero = TransactionDraft::new(
        TransactionType::Transfer,
        TransactionCategory::Investment,
        Money::ZERO,
        Memo::new("noop"),
    );
    assert!(zero.validate_against(&delta).is_err());
}

#[test]
fn planned_entry_records_balance_after_and_sequence() {
    let wallet = wallet_with_balance(10_000);
    let delta = WalletDelta::default().with(WalletField::Balance, Money::from_minor(-2_500));
    let draft = TransactionDraft::new(
        TransactionType::Debit,
        TransactionCategory::Payment,
        Money::from_minor(2_500),
        Memo::new("Loan repayment").with_reference("trip-1"),
    );
    let entry = LedgerEntry::plan(&wallet, &delta, draft, ts()).unwrap();
    assert_eq!(entry.transaction.balance_after, Money::from_minor(7_500));
    assert_eq!(entry.transaction.sequence, entry.wallet.version);
    assert_eq!(entry.transaction.reference_id.as_deref(), Some("trip-1"));
    assert!(entry.transaction.id.starts_with("txn-"));
}

#[test]
fn enums_parse_from_their_storage_names() {
    for t in [
        TransactionType::Credit,
        TransactionType::Debit,
        TransactionType::Transfer,
    ] {
        assert_eq!(t.as_str().parse::<TransactionType>().unwrap(), t);
    }
    assert_eq!(
        "withdrawal".parse::<TransactionCategory>().unwrap(),
        TransactionCategory::Withdrawal
    );
    assert!("bonus".parse::<TransactionCategory>().is_err());
}
