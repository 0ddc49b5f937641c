use std::sync::Arc;

use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use freightfin_core::trips::{Trip, TripBid, TripFilter, TripRepositoryTrait};
use freightfin_core::{Error, Result};

use super::model::{TripBidDB, TripDB};
use crate::db::get_connection;
use crate::errors::StorageError;
use crate::schema::{trip_bids, trips};

pub struct TripRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl TripRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        TripRepository { pool }
    }
}

impl TripRepositoryTrait for TripRepository {
    fn get_trip(&self, trip_id: &str) -> Result<Trip> {
        let mut conn = get_connection(&self.pool)?;
        trips::table
            .find(trip_id)
            .select(TripDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| Error::not_found("Trip", trip_id))
            .and_then(Trip::try_from)
    }

    fn list_trips(&self, filter: &TripFilter) -> Result<Vec<Trip>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = trips::table.select(TripDB::as_select()).into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(trips::status.eq(status.as_str()));
        }
        if let Some(owner) = &filter.load_owner_id {
            query = query.filter(trips::load_owner_id.eq(owner.clone()));
        }
        if let Some(lender) = &filter.lender_id {
            query = query.filter(trips::lender_id.eq(lender.clone()));
        }
        query
            .order(trips::created_at.desc())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(Trip::try_from)
            .collect()
    }

    fn get_bid(&self, bid_id: &str) -> Result<TripBid> {
        let mut conn = get_connection(&self.pool)?;
        trip_bids::table
            .find(bid_id)
            .select(TripBidDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| Error::not_found("TripBid", bid_id))
            .and_then(TripBid::try_from)
    }

    fn list_bids(&self, trip_id: &str) -> Result<Vec<TripBid>> {
        let mut conn = get_connection(&self.pool)?;
        trip_bids::table
            .filter(trip_bids::trip_id.eq(trip_id))
            .order((trip_bids::created_at.asc(), trip_bids::id.asc()))
            .select(TripBidDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(TripBid::try_from)
            .collect()
    }
}
