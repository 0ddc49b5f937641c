use diesel::prelude::*;

use freightfin_core::errors::{Error, Result};
use freightfin_core::trips::{Trip, TripBid, TripStore};

use super::model::{TripBidDB, TripDB};
use crate::errors::StorageError;
use crate::schema::{trip_bids, trips};
use crate::unit_of_work::SqliteStoreTransaction;

impl TripStore for SqliteStoreTransaction<'_> {
    fn insert_trip(&mut self, trip: &Trip) -> Result<()> {
        diesel::insert_into(trips::table)
            .values(&TripDB::from(trip))
            .execute(self.conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn trip_for_update(&mut self, trip_id: &str) -> Result<Trip> {
        trips::table
            .find(trip_id)
            .select(TripDB::as_select())
            .first(self.conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| Error::not_found("Trip", trip_id))
            .and_then(Trip::try_from)
    }

    fn update_trip(&mut self, trip: &Trip) -> Result<()> {
        let updated = diesel::update(trips::table.find(&trip.id))
            .set(&TripDB::from(trip))
            .execute(self.conn)
            .map_err(StorageError::from)?;
        if updated == 0 {
            return Err(Error::not_found("Trip", trip.id.clone()));
        }
        Ok(())
    }

    fn insert_bid(&mut self, bid: &TripBid) -> Result<()> {
        diesel::insert_into(trip_bids::table)
            .values(&TripBidDB::from(bid))
            .execute(self.conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn bid_for_update(&mut self, bid_id: &str) -> Result<TripBid> {
        trip_bids::table
            .find(bid_id)
            .select(TripBidDB::as_select())
            .first(self.conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| Error::not_found("TripBid", bid_id))
            .and_then(TripBid::try_from)
    }

    fn bids_for_trip(&mut self, trip_id: &str) -> Result<Vec<TripBid>> {
        trip_bids::table
            .filter(trip_bids::trip_id.eq(trip_id))
            .order((trip_bids::created_at.asc(), trip_bids::id.asc()))
            .select(TripBidDB::as_select())
            .load(self.conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(TripBid::try_from)
            .collect()
    }

    fn update_bid(&mut self, bid: &TripBid) -> Result<()> {
        let updated = diesel::update(trip_bids::table.find(&bid.id))
            .set(&TripBidDB::from(bid))
            .execute(self.conn)
            .map_err(StorageError::from)?;
        if updated == 0 {
            return Err(Error::not_found("TripBid", bid.id.clone()));
        }
        Ok(())
    }
}
