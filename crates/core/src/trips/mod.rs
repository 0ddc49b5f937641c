//! Trips module - trip and bid records, status graph, registry operations.

mod trips_model;
pub mod trips_registry;
mod trips_service;
mod trips_status;
mod trips_traits;

pub use trips_model::{
    BidStatus, NewBid, NewTrip, RiskLevel, Trip, TripBid, TripFilter, TripStatus,
};
pub use trips_service::TripService;
pub use trips_status::{can_transition, forward_path};
pub use trips_traits::{TripRepositoryTrait, TripServiceTrait, TripStore};
