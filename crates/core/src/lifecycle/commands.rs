//! Tagged request and outcome types for lifecycle operations.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::fees::PlatformFee;
use crate::investments::Investment;
use crate::money::Money;
use crate::trips::{Trip, TripBid, TripStatus};
use crate::wallets::Wallet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBid {
    pub trip_id: String,
    pub lender_id: String,
    pub lender_name: Option<String>,
    pub amount: Money,
    pub interest_rate: Decimal,
    /// Client-supplied key; repeated calls with the same key apply once.
    pub idempotency_key: Option<String>,
}

/// One lifecycle operation, as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum LedgerCommand {
    PlaceBid(PlaceBid),
    AcceptBid {
        trip_id: String,
        bid_id: String,
    },
    WithdrawBid {
        trip_id: String,
        bid_id: String,
    },
    Repay {
        trip_id: String,
    },
    CancelTrip {
        trip_id: String,
    },
    MarkDefaulted {
        investment_id: String,
        /// Evaluation instant; defaults to now.
        as_of: Option<NaiveDateTime>,
    },
}

fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::Validation(ValidationError::MissingField(
            name.to_string(),
        )))
    } else {
        Ok(())
    }
}

impl LedgerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerCommand::PlaceBid(_) => "place_bid",
            LedgerCommand::AcceptBid { .. } => "accept_bid",
            LedgerCommand::WithdrawBid { .. } => "withdraw_bid",
            LedgerCommand::Repay { .. } => "repay",
            LedgerCommand::CancelTrip { .. } => "cancel_trip",
            LedgerCommand::MarkDefaulted { .. } => "mark_defaulted",
        }
    }

    /// Shape checks that need no stored state.
    pub fn validate(&self) -> Result<()> {
        match self {
            LedgerCommand::PlaceBid(cmd) => {
                require("tripId", &cmd.trip_id)?;
                require("lenderId", &cmd.lender_id)?;
                if !cmd.amount.is_positive() {
                    return Err(Error::Validation(ValidationError::invalid(
                        "bid amount must be positive",
                    )));
                }
                if cmd.interest_rate < Decimal::ZERO {
                    return Err(Error::Validation(ValidationError::invalid(
                        "interest rate cannot be negative",
                    )));
                }
                if let Some(key) = &cmd.idempotency_key {
                    require("idempotencyKey", key)?;
                }
                Ok(())
            }
            LedgerCommand::AcceptBid { trip_id, bid_id }
            | LedgerCommand::WithdrawBid { trip_id, bid_id } => {
                require("tripId", trip_id)?;
                require("bidId", bid_id)
            }
            LedgerCommand::Repay { trip_id } | LedgerCommand::CancelTrip { trip_id } => {
                require("tripId", trip_id)
            }
            LedgerCommand::MarkDefaulted { investment_id, .. } => {
                require("investmentId", investment_id)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidPlacement {
    pub trip: Trip,
    pub bid: TripBid,
    pub investment: Investment,
    pub lender_wallet: Wallet,
    pub previous_status: TripStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allotment {
    pub trip: Trip,
    pub bid: TripBid,
    pub investment: Investment,
    pub lender_wallet: Wallet,
    pub borrower_wallet: Wallet,
    pub rejected_bid_ids: Vec<String>,
    pub previous_status: TripStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidWithdrawal {
    pub bid: TripBid,
    pub investment: Option<Investment>,
    pub lender_wallet: Wallet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repayment {
    pub trip: Trip,
    pub investment: Investment,
    pub principal: Money,
    pub yield_amount: Money,
    pub borrower_wallet: Wallet,
    pub lender_wallet: Wallet,
    pub platform_fee: PlatformFee,
    pub previous_status: TripStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cancellation {
    pub trip: Trip,
    pub released_bid_ids: Vec<String>,
    /// Set when a funded trip was cancelled and its loan unwound.
    pub refunded_investment: Option<Investment>,
    pub previous_status: TripStatus,
}

/// Result of [`super::LifecycleCoordinator::execute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandOutcome {
    BidPlaced(BidPlacement),
    BidAccepted(Allotment),
    BidWithdrawn(BidWithdrawal),
    Repaid(Repayment),
    TripCancelled(Cancellation),
    InvestmentDefaulted(Investment),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn commands_deserialize_from_tagged_json() {
        let json = r#"{"type":"place_bid","tripId":"trip-1","lenderId":"lender-1",
            "lenderName":null,"amount":400000,"interestRate":10,"idempotencyKey":null}"#;
        let cmd: LedgerCommand = serde_json::from_str(json).unwrap();
        match &cmd {
            LedgerCommand::PlaceBid(p) => {
                assert_eq!(p.amount, Money::from_minor(400_000));
                assert_eq!(p.interest_rate, dec!(10));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(cmd.name(), "place_bid");
        assert!(cmd.validate().is_ok());

        let repay: LedgerCommand =
            serde_json::from_str(r#"{"type":"repay","tripId":"trip-9"}"#).unwrap();
        assert_eq!(
            repay,
            LedgerCommand::Repay {
                trip_id: "trip-9".to_string()
            }
        );
    }

    #[test]
    fn validation_rejects_blank_ids_and_bad_amounts() {
        let blank = LedgerCommand::AcceptBid {
            trip_id: "trip-1".to_string(),
            bid_id: " ".to_string(),
        };
        assert!(blank.validate().is_err());

        let zero = LedgerCommand::PlaceBid(PlaceBid {
            trip_id: "trip-1".to_string(),
            lender_id: "lender-1".to_string(),
            lender_name: None,
            amount: Money::ZERO,
            interest_rate: dec!(10),
            idempotency_key: None,
        });
        assert!(zero.validate().is_err());
    }

    #[test]
    fn unknown_command_type_is_rejected() {
        let parsed: std::result::Result<LedgerCommand, _> =
            serde_json::from_str(r#"{"type":"refund_everyone"}"#);
        assert!(parsed.is_err());
    }
}
