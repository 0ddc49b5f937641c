//! Domain event types.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::trips::TripStatus;

/// Domain events emitted by core services after a unit of work commits.
///
/// These events describe what happened. Adapters translate them into
/// notifications for the affected users.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A load owner posted a new trip.
    TripCreated {
        trip_id: String,
        load_owner_id: String,
        amount: Money,
    },

    /// A trip moved along its status graph.
    TripStatusChanged {
        trip_id: String,
        from: TripStatus,
        to: TripStatus,
    },

    /// A lender escrowed funds against a trip.
    BidReceived {
        trip_id: String,
        bid_id: String,
        lender_id: String,
        load_owner_id: String,
        amount: Money,
    },

    /// A lender pulled an open bid; its escrow was released.
    BidWithdrawn {
        trip_id: String,
        bid_id: String,
        lender_id: String,
    },

    /// A bid was accepted and its escrow invested in the trip.
    InvestmentAllotted {
        trip_id: String,
        bid_id: String,
        investment_id: String,
        lender_id: String,
        borrower_id: String,
        amount: Money,
    },

    /// The borrower repaid principal and yield.
    TripRepaid {
        trip_id: String,
        lender_id: String,
        borrower_id: String,
        principal: Money,
        yield_amount: Money,
        fee_amount: Money,
    },

    /// A trip was cancelled and every open bid released.
    TripCancelled {
        trip_id: String,
        released_bid_ids: Vec<String>,
    },

    /// An active investment passed maturity without repayment.
    InvestmentDefaulted {
        investment_id: String,
        trip_id: String,
        lender_id: String,
    },
}

impl DomainEvent {
    pub fn trip_created(trip_id: String, load_owner_id: String, amount: Money) -> Self {
        Self::TripCreated {
            trip_id,
            load_owner_id,
            amount,
        }
    }

    pub fn trip_status_changed(trip_id: String, from: TripStatus, to: TripStatus) -> Self {
        Self::TripStatusChanged { trip_id, from, to }
    }

    pub fn bid_received(
        trip_id: String,
        bid_id: String,
        lender_id: String,
        load_owner_id: String,
        amount: Money,
    ) -> Self {
        Self::BidReceived {
            trip_id,
            bid_id,
            lender_id,
            load_owner_id,
            amount,
        }
    }

    pub fn bid_withdrawn(trip_id: String, bid_id: String, lender_id: String) -> Self {
        Self::BidWithdrawn {
            trip_id,
            bid_id,
            lender_id,
        }
    }

    pub fn investment_allotted(
        trip_id: String,
        bid_id: String,
        investment_id: String,
        lender_id: String,
        borrower_id: String,
        amount: Money,
    ) -> Self {
        Self::InvestmentAllotted {
            trip_id,
            bid_id,
            investment_id,
            lender_id,
            borrower_id,
            amount,
        }
    }

    pub fn trip_repaid(
        trip_id: String,
        lender_id: String,
        borrower_id: String,
        principal: Money,
        yield_amount: Money,
        fee_amount: Money,
    ) -> Self {
        Self::TripRepaid {
            trip_id,
            lender_id,
            borrower_id,
            principal,
            yield_amount,
            fee_amount,
        }
    }

    pub fn trip_cancelled(trip_id: String, released_bid_ids: Vec<String>) -> Self {
        Self::TripCancelled {
            trip_id,
            released_bid_ids,
        }
    }

    pub fn investment_defaulted(investment_id: String, trip_id: String, lender_id: String) -> Self {
        Self::InvestmentDefaulted {
            investment_id,
            trip_id,
            lender_id,
        }
    }

    /// Every event concerns exactly one trip.
    pub fn trip_id(&self) -> &str {
        match self {
            Self::TripCreated { trip_id, .. }
            | Self::TripStatusChanged { trip_id, .. }
            | Self::BidReceived { trip_id, .. }
            | Self::BidWithdrawn { trip_id, .. }
            | Self::InvestmentAllotted { trip_id, .. }
            | Self::TripRepaid { trip_id, .. }
            | Self::TripCancelled { trip_id, .. }
            | Self::InvestmentDefaulted { trip_id, .. } => trip_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_event_serialization() {
        let event = DomainEvent::bid_received(
            "trip-1".to_string(),
            "bid-1".to_string(),
            "lender-1".to_string(),
            "owner-1".to_string(),
            Money::from_minor(400_000),
        );

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"bid_received\""));

        let deserialized: DomainEvent = serde_json::from_str(&json).unwrap();
        match deserialized {
            DomainEvent::BidReceived {
                trip_id,
                lender_id,
                amount,
                ..
            } => {
                assert_eq!(trip_id, "trip-1");
                assert_eq!(lender_id, "lender-1");
                assert_eq!(amount, Money::from_minor(400_000));
            }
            _ => panic!("Expected BidReceived"),
        }
    }

    #[test]
    fn test_status_change_uses_snake_case_statuses() {
        let event = DomainEvent::trip_status_changed(
            "trip-1".to_string(),
            TripStatus::Funded,
            TripStatus::InTransit,
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"to\":\"in_transit\""));
        let back: DomainEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
