use diesel::prelude::*;

use freightfin_core::errors::Result;
use freightfin_core::fees::{FeeStore, PlatformFee};

use super::model::PlatformFeeDB;
use crate::errors::StorageError;
use crate::schema::platform_fees;
use crate::unit_of_work::SqliteStoreTransaction;

impl FeeStore for SqliteStoreTransaction<'_> {
    fn insert_platform_fee(&mut self, fee: &PlatformFee) -> Result<()> {
        diesel::insert_into(platform_fees::table)
            .values(&PlatformFeeDB::from(fee))
            .execute(self.conn)
            .map_err(StorageError::from)?;
        Ok(())
    }
}
