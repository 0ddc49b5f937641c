//! Stored outcomes of lifecycle operations, keyed by idempotency key.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use freightfin_core::errors::Result;
use freightfin_core::lifecycle::{IdempotencyRecord, IdempotencyStore};

use crate::errors::IntoCore;
use crate::schema::idempotency_keys;
use crate::unit_of_work::SqliteStoreTransaction;

#[derive(Queryable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::idempotency_keys)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct IdempotencyKeyDB {
    pub idempotency_key: String,
    pub operation: String,
    pub outcome: String,
    pub created_at: NaiveDateTime,
}

impl From<IdempotencyKeyDB> for IdempotencyRecord {
    fn from(db: IdempotencyKeyDB) -> Self {
        Self {
            key: db.idempotency_key,
            operation: db.operation,
            outcome: db.outcome,
            created_at: db.created_at,
        }
    }
}

impl From<&IdempotencyRecord> for IdempotencyKeyDB {
    fn from(record: &IdempotencyRecord) -> Self {
        Self {
            idempotency_key: record.key.clone(),
            operation: record.operation.clone(),
            outcome: record.outcome.clone(),
            created_at: record.created_at,
        }
    }
}

impl IdempotencyStore for SqliteStoreTransaction<'_> {
    fn get_idempotency_record(&mut self, key: &str) -> Result<Option<IdempotencyRecord>> {
        let row = idempotency_keys::table
            .find(key)
            .select(IdempotencyKeyDB::as_select())
            .first(self.conn)
            .optional()
            .into_core()?;
        Ok(row.map(IdempotencyRecord::from))
    }

    fn insert_idempotency_record(&mut self, record: &IdempotencyRecord) -> Result<()> {
        diesel::insert_into(idempotency_keys::table)
            .values(&IdempotencyKeyDB::from(record))
            .execute(self.conn)
            .into_core()?;
        Ok(())
    }
}
