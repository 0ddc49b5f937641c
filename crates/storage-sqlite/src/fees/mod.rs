//! SQLite storage for collected platform fees.

mod model;
mod repository;
mod store;

pub use model::PlatformFeeDB;
pub use repository::PlatformFeeRepository;
