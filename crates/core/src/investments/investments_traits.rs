use chrono::NaiveDateTime;

use super::investments_model::{Investment, InvestmentFilter};
use crate::errors::Result;

/// Investment writes inside a unit of work.
pub trait InvestmentStore {
    fn insert_investment(&mut self, investment: &Investment) -> Result<()>;

    fn investment_for_update(&mut self, investment_id: &str) -> Result<Investment>;

    fn investment_for_bid(&mut self, bid_id: &str) -> Result<Option<Investment>>;

    fn update_investment(&mut self, investment: &Investment) -> Result<()>;
}

pub trait InvestmentRepositoryTrait: Send + Sync {
    fn get_investment(&self, investment_id: &str) -> Result<Investment>;

    fn list_investments(&self, filter: &InvestmentFilter) -> Result<Vec<Investment>>;

    /// Active investments whose maturity date is before `now`.
    fn list_overdue(&self, now: NaiveDateTime) -> Result<Vec<Investment>>;
}
