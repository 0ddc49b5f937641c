//! SQLite storage for trips and their bids.

mod model;
mod repository;
mod store;

pub use model::{TripBidDB, TripDB};
pub use repository::TripRepository;
