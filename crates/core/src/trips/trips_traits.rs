use async_trait::async_trait;

use super::trips_model::{NewTrip, Trip, TripBid, TripFilter, TripStatus};
use crate::errors::Result;

/// Trip and bid writes inside a unit of work.
pub trait TripStore {
    fn insert_trip(&mut self, trip: &Trip) -> Result<()>;

    /// Fails with `NotFound` if the trip does not exist.
    fn trip_for_update(&mut self, trip_id: &str) -> Result<Trip>;

    fn update_trip(&mut self, trip: &Trip) -> Result<()>;

    fn insert_bid(&mut self, bid: &TripBid) -> Result<()>;

    /// Fails with `NotFound` if the bid does not exist.
    fn bid_for_update(&mut self, bid_id: &str) -> Result<TripBid>;

    /// Bids of a trip, oldest first.
    fn bids_for_trip(&mut self, trip_id: &str) -> Result<Vec<TripBid>>;

    fn update_bid(&mut self, bid: &TripBid) -> Result<()>;
}

pub trait TripRepositoryTrait: Send + Sync {
    fn get_trip(&self, trip_id: &str) -> Result<Trip>;

    fn list_trips(&self, filter: &TripFilter) -> Result<Vec<Trip>>;

    fn get_bid(&self, bid_id: &str) -> Result<TripBid>;

    fn list_bids(&self, trip_id: &str) -> Result<Vec<TripBid>>;
}

#[async_trait]
pub trait TripServiceTrait: Send + Sync {
    async fn create_trip(&self, input: NewTrip) -> Result<Trip>;

    /// Moves a trip along the operational part of its lifecycle
    /// (`funded -> in_transit -> completed`).
    ///
    /// Statuses that carry money movement are reachable only through the
    /// lifecycle coordinator.
    async fn transition_status(&self, trip_id: &str, status: TripStatus) -> Result<Trip>;

    fn get_trip(&self, trip_id: &str) -> Result<Trip>;

    fn list_trips(&self, filter: &TripFilter) -> Result<Vec<Trip>>;

    fn list_bids(&self, trip_id: &str) -> Result<Vec<TripBid>>;
}
