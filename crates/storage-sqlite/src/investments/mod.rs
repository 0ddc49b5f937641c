//! SQLite storage for investments.

mod model;
mod repository;
mod store;

pub use model::InvestmentDB;
pub use repository::InvestmentRepository;
