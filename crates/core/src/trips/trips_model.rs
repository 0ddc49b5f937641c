//! Trip and bid domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::MAX_MATURITY_DAYS;
use crate::errors::{Error, Result, ValidationError};
use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Pending,
    Escrowed,
    Funded,
    InTransit,
    Completed,
    Cancelled,
    Repaid,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Pending => "pending",
            TripStatus::Escrowed => "escrowed",
            TripStatus::Funded => "funded",
            TripStatus::InTransit => "in_transit",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
            TripStatus::Repaid => "repaid",
        }
    }

    /// Trip still accepts bids.
    pub fn is_open_for_bids(&self) -> bool {
        matches!(self, TripStatus::Pending | TripStatus::Escrowed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TripStatus::Cancelled | TripStatus::Repaid)
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(TripStatus::Pending),
            "escrowed" => Ok(TripStatus::Escrowed),
            "funded" => Ok(TripStatus::Funded),
            "in_transit" => Ok(TripStatus::InTransit),
            "completed" => Ok(TripStatus::Completed),
            "cancelled" => Ok(TripStatus::Cancelled),
            "repaid" => Ok(TripStatus::Repaid),
            other => Err(Error::Validation(ValidationError::invalid(format!(
                "unknown trip status '{}'",
                other
            )))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl FromStr for RiskLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(Error::Validation(ValidationError::invalid(format!(
                "unknown risk level '{}'",
                other
            )))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Open,
    Accepted,
    Rejected,
    Withdrawn,
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BidStatus::Open => "open",
            BidStatus::Accepted => "accepted",
            BidStatus::Rejected => "rejected",
            BidStatus::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BidStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(BidStatus::Open),
            "accepted" => Ok(BidStatus::Accepted),
            "rejected" => Ok(BidStatus::Rejected),
            "withdrawn" => Ok(BidStatus::Withdrawn),
            other => Err(Error::Validation(ValidationError::invalid(format!(
                "unknown bid status '{}'",
                other
            )))),
        }
    }
}

/// A financing request posted by a load owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub load_owner_id: String,
    pub load_owner_name: Option<String>,
    pub origin: String,
    pub destination: String,
    pub load_type: Option<String>,
    pub amount: Money,
    pub interest_rate: Option<Decimal>,
    pub maturity_days: Option<i32>,
    pub risk_level: Option<RiskLevel>,
    pub insurance_status: bool,
    pub status: TripStatus,
    pub lender_id: Option<String>,
    pub lender_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub funded_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

/// Input for creating a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub load_owner_id: String,
    pub load_owner_name: Option<String>,
    pub origin: String,
    pub destination: String,
    pub load_type: Option<String>,
    pub amount: Money,
    pub interest_rate: Option<Decimal>,
    pub maturity_days: Option<i32>,
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub insurance_status: bool,
}

impl NewTrip {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("loadOwnerId", &self.load_owner_id),
            ("origin", &self.origin),
            ("destination", &self.destination),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Validation(ValidationError::MissingField(
                    name.to_string(),
                )));
            }
        }
        if !self.amount.is_positive() {
            return Err(Error::Validation(ValidationError::invalid(
                "trip amount must be positive",
            )));
        }
        if let Some(rate) = self.interest_rate {
            if rate < Decimal::ZERO {
                return Err(Error::Validation(ValidationError::invalid(
                    "interest rate cannot be negative",
                )));
            }
        }
        if let Some(days) = self.maturity_days {
            if !(1..=MAX_MATURITY_DAYS).contains(&days) {
                return Err(Error::Validation(ValidationError::invalid(format!(
                    "maturity days must be between 1 and {}, got {}",
                    MAX_MATURITY_DAYS, days
                ))));
            }
        }
        Ok(())
    }
}

/// A lender's offer to fund a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripBid {
    pub id: String,
    pub trip_id: String,
    pub lender_id: String,
    pub lender_name: Option<String>,
    pub amount: Money,
    pub interest_rate: Decimal,
    pub status: BidStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBid {
    pub trip_id: String,
    pub lender_id: String,
    pub lender_name: Option<String>,
    pub amount: Money,
    pub interest_rate: Decimal,
}

impl NewBid {
    pub fn validate(&self) -> Result<()> {
        if self.trip_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "tripId".to_string(),
            )));
        }
        if self.lender_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "lenderId".to_string(),
            )));
        }
        if !self.amount.is_positive() {
            return Err(Error::Validation(ValidationError::invalid(
                "bid amount must be positive",
            )));
        }
        if self.interest_rate < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::invalid(
                "interest rate cannot be negative",
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripFilter {
    pub status: Option<TripStatus>,
    pub load_owner_id: Option<String>,
    pub lender_id: Option<String>,
}
