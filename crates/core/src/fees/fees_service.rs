use std::sync::Arc;

use chrono::NaiveDateTime;

use super::fees_model::{PlatformFee, PlatformFeeFilter, PlatformFeeStats};
use super::fees_traits::{PlatformFeeRepositoryTrait, PlatformFeeServiceTrait};
use crate::errors::{Error, Result, ValidationError};
use crate::money::Money;

/// Read-side reporting over collected platform fees.
pub struct PlatformFeeService {
    repository: Arc<dyn PlatformFeeRepositoryTrait>,
}

impl PlatformFeeService {
    pub fn new(repository: Arc<dyn PlatformFeeRepositoryTrait>) -> Self {
        Self { repository }
    }
}

fn check_range(from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Result<()> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(Error::Validation(ValidationError::invalid(
            format!("date range start {} is after end {}", from, to),
        ))),
        _ => Ok(()),
    }
}

impl PlatformFeeServiceTrait for PlatformFeeService {
    fn list_platform_fees(&self, filter: &PlatformFeeFilter) -> Result<Vec<PlatformFee>> {
        check_range(filter.from, filter.to)?;
        self.repository.list_platform_fees(filter)
    }

    fn total_collected(
        &self,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<Money> {
        check_range(from, to)?;
        self.repository.total_collected(from, to)
    }

    fn stats(&self, filter: &PlatformFeeFilter) -> Result<PlatformFeeStats> {
        let fees = self.list_platform_fees(filter)?;
        PlatformFeeStats::from_fees(&fees)
    }
}
