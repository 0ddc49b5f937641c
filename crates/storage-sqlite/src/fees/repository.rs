use std::sync::Arc;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use freightfin_core::fees::{PlatformFee, PlatformFeeFilter, PlatformFeeRepositoryTrait};
use freightfin_core::money::Money;
use freightfin_core::Result;

use super::model::PlatformFeeDB;
use crate::db::get_connection;
use crate::errors::StorageError;
use crate::schema::platform_fees;

pub struct PlatformFeeRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl PlatformFeeRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        PlatformFeeRepository { pool }
    }
}

impl PlatformFeeRepositoryTrait for PlatformFeeRepository {
    fn list_platform_fees(&self, filter: &PlatformFeeFilter) -> Result<Vec<PlatformFee>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = platform_fees::table
            .select(PlatformFeeDB::as_select())
            .into_boxed();
        if let Some(trip) = &filter.trip_id {
            query = query.filter(platform_fees::trip_id.eq(trip.clone()));
        }
        if let Some(lender) = &filter.lender_id {
            query = query.filter(platform_fees::lender_id.eq(lender.clone()));
        }
        if let Some(borrower) = &filter.borrower_id {
            query = query.filter(platform_fees::borrower_id.eq(borrower.clone()));
        }
        if let Some(from) = filter.from {
            query = query.filter(platform_fees::collected_at.ge(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(platform_fees::collected_at.le(to));
        }
        query
            .order(platform_fees::collected_at.desc())
            .load(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(PlatformFee::try_from)
            .collect()
    }

    fn total_collected(
        &self,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<Money> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = platform_fees::table
            .select(platform_fees::fee_amount)
            .into_boxed();
        if let Some(from) = from {
            query = query.filter(platform_fees::collected_at.ge(from));
        }
        if let Some(to) = to {
            query = query.filter(platform_fees::collected_at.le(to));
        }
        let amounts: Vec<i64> = query.load(&mut conn).map_err(StorageError::from)?;
        Money::try_sum(amounts.into_iter().map(Money::from_minor), "fees collected")
    }
}
