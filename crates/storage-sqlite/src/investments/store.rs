use diesel::prelude::*;

use freightfin_core::errors::{Error, Result};
use freightfin_core::investments::{Investment, InvestmentStore};

use super::model::InvestmentDB;
use crate::errors::StorageError;
use crate::schema::investments;
use crate::unit_of_work::SqliteStoreTransaction;

impl InvestmentStore for SqliteStoreTransaction<'_> {
    fn insert_investment(&mut self, investment: &Investment) -> Result<()> {
        diesel::insert_into(investments::table)
            .values(&InvestmentDB::from(investment))
            .execute(self.conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn investment_for_update(&mut self, investment_id: &str) -> Result<Investment> {
        investments::table
            .find(investment_id)
            .select(InvestmentDB::as_select())
            .first(self.conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| Error::not_found("Investment", investment_id))
            .and_then(Investment::try_from)
    }

    fn investment_for_bid(&mut self, bid_id: &str) -> Result<Option<Investment>> {
        investments::table
            .filter(investments::bid_id.eq(bid_id))
            .select(InvestmentDB::as_select())
            .first(self.conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Investment::try_from)
            .transpose()
    }

    fn update_investment(&mut self, investment: &Investment) -> Result<()> {
        let updated = diesel::update(investments::table.find(&investment.id))
            .set(&InvestmentDB::from(investment))
            .execute(self.conn)
            .map_err(StorageError::from)?;
        if updated == 0 {
            return Err(Error::not_found("Investment", investment.id.clone()));
        }
        Ok(())
    }
}
