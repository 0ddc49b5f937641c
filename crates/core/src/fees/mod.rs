//! Fees module - platform fee calculation, realization and reporting.

mod fees_calculator;
mod fees_model;
mod fees_service;
mod fees_traits;

pub use fees_calculator::{compute_and_record, compute_fee, FeeContext};
pub use fees_model::{FeeBearer, PlatformFee, PlatformFeeFilter, PlatformFeeStats};
pub use fees_service::PlatformFeeService;
pub use fees_traits::{FeeStore, PlatformFeeRepositoryTrait, PlatformFeeServiceTrait};
