//! Database models for trips and bids.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use freightfin_core::money::Money;
use freightfin_core::trips::{Trip, TripBid};

use crate::utils::{decimal_to_text, parse_column, parse_decimal, parse_optional_decimal};

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::trips)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct TripDB {
    pub id: String,
    pub load_owner_id: String,
    pub load_owner_name: Option<String>,
    pub origin: String,
    pub destination: String,
    pub load_type: Option<String>,
    pub amount: i64,
    pub interest_rate: Option<String>,
    pub maturity_days: Option<i32>,
    pub risk_level: Option<String>,
    pub insurance_status: bool,
    pub status: String,
    pub lender_id: Option<String>,
    pub lender_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub funded_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Associations,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(belongs_to(TripDB, foreign_key = trip_id))]
#[diesel(table_name = crate::schema::trip_bids)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct TripBidDB {
    pub id: String,
    pub trip_id: String,
    pub lender_id: String,
    pub lender_name: Option<String>,
    pub amount: i64,
    pub interest_rate: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<&Trip> for TripDB {
    fn from(trip: &Trip) -> Self {
        Self {
            id: trip.id.clone(),
            load_owner_id: trip.load_owner_id.clone(),
            load_owner_name: trip.load_owner_name.clone(),
            origin: trip.origin.clone(),
            destination: trip.destination.clone(),
            load_type: trip.load_type.clone(),
            amount: trip.amount.minor(),
            interest_rate: trip.interest_rate.map(decimal_to_text),
            maturity_days: trip.maturity_days,
            risk_level: trip.risk_level.map(|r| r.as_str().to_string()),
            insurance_status: trip.insurance_status,
            status: trip.status.as_str().to_string(),
            lender_id: trip.lender_id.clone(),
            lender_name: trip.lender_name.clone(),
            created_at: trip.created_at,
            updated_at: trip.updated_at,
            funded_at: trip.funded_at,
            completed_at: trip.completed_at,
        }
    }
}

impl TryFrom<TripDB> for Trip {
    type Error = freightfin_core::Error;

    fn try_from(db: TripDB) -> Result<Self, Self::Error> {
        Ok(Self {
            interest_rate: parse_optional_decimal("trips.interest_rate", db.interest_rate.as_deref())?,
            risk_level: db
                .risk_level
                .as_deref()
                .map(|raw| parse_column("trips.risk_level", raw))
                .transpose()?,
            status: parse_column("trips.status", &db.status)?,
            id: db.id,
            load_owner_id: db.load_owner_id,
            load_owner_name: db.load_owner_name,
            origin: db.origin,
            destination: db.destination,
            load_type: db.load_type,
            amount: Money::from_minor(db.amount),
            maturity_days: db.maturity_days,
            insurance_status: db.insurance_status,
            lender_id: db.lender_id,
            lender_name: db.lender_name,
            created_at: db.created_at,
            updated_at: db.updated_at,
            funded_at: db.funded_at,
            completed_at: db.completed_at,
        })
    }
}

impl From<&TripBid> for TripBidDB {
    fn from(bid: &TripBid) -> Self {
        Self {
            id: bid.id.clone(),
            trip_id: bid.trip_id.clone(),
            lender_id: bid.lender_id.clone(),
            lender_name: bid.lender_name.clone(),
            amount: bid.amount.minor(),
            interest_rate: decimal_to_text(bid.interest_rate),
            status: bid.status.as_str().to_string(),
            created_at: bid.created_at,
            updated_at: bid.updated_at,
        }
    }
}

impl TryFrom<TripBidDB> for TripBid {
    type Error = freightfin_core::Error;

    fn try_from(db: TripBidDB) -> Result<Self, Self::Error> {
        Ok(Self {
            interest_rate: parse_decimal("trip_bids.interest_rate", &db.interest_rate)?,
            status: parse_column("trip_bids.status", &db.status)?,
            id: db.id,
            trip_id: db.trip_id,
            lender_id: db.lender_id,
            lender_name: db.lender_name,
            amount: Money::from_minor(db.amount),
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}
