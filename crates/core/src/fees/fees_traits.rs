use chrono::NaiveDateTime;

use super::fees_model::{PlatformFee, PlatformFeeFilter, PlatformFeeStats};
use crate::errors::Result;
use crate::money::Money;

/// Fee writes inside a unit of work.
pub trait FeeStore {
    fn insert_platform_fee(&mut self, fee: &PlatformFee) -> Result<()>;
}

pub trait PlatformFeeRepositoryTrait: Send + Sync {
    /// Fees matching `filter`, most recently collected first.
    fn list_platform_fees(&self, filter: &PlatformFeeFilter) -> Result<Vec<PlatformFee>>;

    fn total_collected(
        &self,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<Money>;
}

pub trait PlatformFeeServiceTrait: Send + Sync {
    fn list_platform_fees(&self, filter: &PlatformFeeFilter) -> Result<Vec<PlatformFee>>;

    fn total_collected(
        &self,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<Money>;

    fn stats(&self, filter: &PlatformFeeFilter) -> Result<PlatformFeeStats>;
}
