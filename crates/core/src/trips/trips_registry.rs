//! Trip/bid registry operations over a [`TripStore`]. No money moves here.

use chrono::NaiveDateTime;
use log::info;

use super::trips_model::{BidStatus, NewBid, NewTrip, Trip, TripBid, TripStatus};
use super::trips_status::can_transition;
use super::trips_traits::TripStore;
use crate::errors::{Error, Result};
use crate::utils::ids::{new_id, BID_ID_PREFIX, TRIP_ID_PREFIX};

pub fn create_trip<S: TripStore + ?Sized>(
    store: &mut S,
    input: NewTrip,
    now: NaiveDateTime,
) -> Result<Trip> {
    input.validate()?;
    let trip = Trip {
        id: new_id(TRIP_ID_PREFIX),
        load_owner_id: input.load_owner_id,
        load_owner_name: input.load_owner_name,
        origin: input.origin,
        destination: input.destination,
        load_type: input.load_type,
        amount: input.amount,
        interest_rate: input.interest_rate,
        maturity_days: input.maturity_days,
        risk_level: input.risk_level,
        insurance_status: input.insurance_status,
        status: TripStatus::Pending,
        lender_id: None,
        lender_name: None,
        created_at: now,
        updated_at: now,
        funded_at: None,
        completed_at: None,
    };
    store.insert_trip(&trip)?;
    info!("Created trip {} for {}", trip.id, trip.load_owner_id);
    Ok(trip)
}

/// Records a bid against an existing trip.
///
/// The registry does not look at the trip status; callers that move money
/// gate on it first.
pub fn add_bid<S: TripStore + ?Sized>(
    store: &mut S,
    input: NewBid,
    now: NaiveDateTime,
) -> Result<TripBid> {
    input.validate()?;
    store.trip_for_update(&input.trip_id)?;
    let bid = TripBid {
        id: new_id(BID_ID_PREFIX),
        trip_id: input.trip_id,
        lender_id: input.lender_id,
        lender_name: input.lender_name,
        amount: input.amount,
        interest_rate: input.interest_rate,
        status: BidStatus::Open,
        created_at: now,
        updated_at: now,
    };
    store.insert_bid(&bid)?;
    Ok(bid)
}

/// Marks `bid_id` accepted and moves the trip to `funded`, taking the
/// lender and rate from the bid.
pub fn accept_bid<S: TripStore + ?Sized>(
    store: &mut S,
    trip_id: &str,
    bid_id: &str,
    now: NaiveDateTime,
) -> Result<(Trip, TripBid)> {
    let mut trip = store.trip_for_update(trip_id)?;
    if !trip.status.is_open_for_bids() {
        return Err(Error::invalid_transition(trip.status, TripStatus::Funded));
    }
    let mut bid = store.bid_for_update(bid_id)?;
    if bid.trip_id != trip.id {
        return Err(Error::not_found("TripBid", format!("{} on trip {}", bid_id, trip_id)));
    }
    if bid.status != BidStatus::Open {
        return Err(Error::invalid_transition(bid.status, BidStatus::Accepted));
    }

    bid.status = BidStatus::Accepted;
    bid.updated_at = now;
    store.update_bid(&bid)?;

    trip.lender_id = Some(bid.lender_id.clone());
    trip.lender_name = bid.lender_name.clone();
    trip.interest_rate = Some(bid.interest_rate);
    trip.status = TripStatus::Funded;
    trip.funded_at = Some(now);
    trip.updated_at = now;
    store.update_trip(&trip)?;
    info!("Trip {} funded by bid {} ({})", trip.id, bid.id, bid.lender_id);
    Ok((trip, bid))
}

/// Moves a trip one step along its status graph.
pub fn transition_status<S: TripStore + ?Sized>(
    store: &mut S,
    trip_id: &str,
    to: TripStatus,
    now: NaiveDateTime,
) -> Result<Trip> {
    let mut trip = store.trip_for_update(trip_id)?;
    apply_transition(&mut trip, to, now)?;
    store.update_trip(&trip)?;
    info!("Trip {} moved to {}", trip.id, to);
    Ok(trip)
}

pub(crate) fn apply_transition(trip: &mut Trip, to: TripStatus, now: NaiveDateTime) -> Result<()> {
    if !can_transition(trip.status, to) {
        return Err(Error::invalid_transition(trip.status, to));
    }
    trip.status = to;
    trip.updated_at = now;
    if to == TripStatus::Completed {
        trip.completed_at = Some(now);
    }
    Ok(())
}

/// Closes an open bid as rejected or withdrawn.
pub fn close_bid<S: TripStore + ?Sized>(
    store: &mut S,
    bid: &mut TripBid,
    status: BidStatus,
    now: NaiveDateTime,
) -> Result<()> {
    if bid.status != BidStatus::Open || status == BidStatus::Open || status == BidStatus::Accepted {
        return Err(Error::invalid_transition(bid.status, status));
    }
    bid.status = status;
    bid.updated_at = now;
    store.update_bid(bid)
}
