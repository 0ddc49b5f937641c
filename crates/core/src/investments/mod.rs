//! Investments module - lender-side records and yield calculation.

mod investments_model;
mod investments_traits;

pub use investments_model::{
    expected_return, InterestBasis, Investment, InvestmentFilter, InvestmentStatus,
};
pub use investments_traits::{InvestmentRepositoryTrait, InvestmentStore};
