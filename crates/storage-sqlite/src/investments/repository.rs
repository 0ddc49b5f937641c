use std::sync::Arc;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use freightfin_core::investments::{
    Investment, InvestmentFilter, InvestmentRepositoryTrait, InvestmentStatus,
};
use freightfin_core::{Error, Result};

use super::model::InvestmentDB;
use crate::db::get_connection;
use crate::errors::StorageError;
use crate::schema::investments;

pub struct InvestmentRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl InvestmentRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        InvestmentRepository { pool }
    }
}

impl InvestmentRepositoryTrait for InvestmentRepository {
    fn get_investment(&self, investment_id: &str) -> Result<Investment> {
        let mut conn = get_connection(&self.pool)?;
        investments::table
            .find(investment_id)
            .select(InvestmentDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| Error::not_found("Investment", investment_id))
            .and_then(Investment::try_from)
    }

    fn list_investments(&self, filter: &InvestmentFilter) -> Result<Vec<Investment>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = investments::table
            .select(InvestmentDB::as_select())
            .into_boxed();
        if let Some(lender) = &filter.lender_id {
            query = query.filter(investments::lender_id.eq(lender.clone()));
        }
        if let Some(trip) = &filter.trip_id {
            query = query.filter(investments::trip_id.eq(trip.clone()));
        }
        if let Some(status) = filter.status {
            query = query.filter(investments::status.eq(status.as_str()));
        }
        query
            .order(investments::created_at.desc())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(Investment::try_from)
            .collect()
    }

    fn list_overdue(&self, now: NaiveDateTime) -> Result<Vec<Investment>> {
        let mut conn = get_connection(&self.pool)?;
        investments::table
            .filter(investments::status.eq(InvestmentStatus::Active.as_str()))
            .filter(investments::maturity_date.lt(now))
            .order(investments::maturity_date.asc())
            .select(InvestmentDB::as_select())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(Investment::try_from)
            .collect()
    }
}
