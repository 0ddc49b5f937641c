//! Unit of work backed by the single-writer actor.
//!
//! Every job runs inside one `BEGIN IMMEDIATE` transaction on the writer's
//! connection. The store traits of `freightfin_core` are implemented for
//! [`SqliteStoreTransaction`] in the per-entity modules.

use std::any::Any;

use async_trait::async_trait;
use diesel::SqliteConnection;
use freightfin_core::unit_of_work::{TxJob, UnitOfWork};
use freightfin_core::Result;

use crate::db::WriteHandle;

/// The store view handed to a unit-of-work job. It borrows the writer's
/// connection for the duration of one transaction.
pub struct SqliteStoreTransaction<'c> {
    pub(crate) conn: &'c mut SqliteConnection,
}

impl<'c> SqliteStoreTransaction<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }
}

#[derive(Clone)]
pub struct SqliteUnitOfWork {
    writer: WriteHandle,
}

impl SqliteUnitOfWork {
    pub fn new(writer: WriteHandle) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    async fn execute_boxed(&self, job: TxJob) -> Result<Box<dyn Any + Send>> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| {
                let mut tx = SqliteStoreTransaction::new(conn);
                job(&mut tx)
            })
            .await
    }
}
