use super::DbPool;
use crate::errors::StorageError;
use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::SqliteConnection;
use freightfin_core::errors::{DatabaseError, Error, Result};
use log::{debug, error, warn};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tokio::sync::{mpsc, oneshot};

// A write job runs against the actor's connection inside one immediate
// transaction. Its result is type-erased so a single channel carries every job.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;
type ErasedReply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

/// Bound on queued write jobs before senders start waiting.
const WRITE_QUEUE_CAPACITY: usize = 1024;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(Job<Box<dyn Any + Send + 'static>>, ErasedReply)>,
}

fn writer_gone() -> Error {
    Error::Database(DatabaseError::Internal(
        "writer actor is no longer running".to_string(),
    ))
}

impl WriteHandle {
    /// Executes `job` on the writer's dedicated connection.
    ///
    /// The job runs inside `BEGIN IMMEDIATE ... COMMIT`; any error rolls the
    /// whole job back and is returned unchanged. A job that panics is rolled
    /// back too and reported as `Error::Unexpected`; the writer keeps serving.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| writer_gone())?;

        let boxed = ret_rx.await.map_err(|_| writer_gone())??;
        boxed
            .downcast::<T>()
            .map(|v| *v)
            .map_err(|_| Error::Unexpected("writer actor returned an unexpected type".to_string()))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Spawns a background Tokio task that acts as the single writer to the
/// database. The actor owns one pooled connection and runs jobs serially, so
/// two writes never interleave inside this process.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(Job<Box<dyn Any + Send + 'static>>, ErasedReply)>(
        WRITE_QUEUE_CAPACITY,
    );

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("Writer actor could not acquire a connection: {}", e);
                while let Some((_, reply_tx)) = rx.recv().await {
                    let _ = reply_tx.send(Err(Error::Database(
                        DatabaseError::ConnectionFailed(e.to_string()),
                    )));
                }
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let conn_ref = &mut *conn;
            let outcome = catch_unwind(AssertUnwindSafe(move || {
                conn_ref
                    .immediate_transaction::<_, StorageError, _>(|c| {
                        job(c).map_err(StorageError::from)
                    })
                    .map_err(Error::from)
            }));

            let result: Result<Box<dyn Any + Send + 'static>> = match outcome {
                Ok(result) => result,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!("Write job panicked, rolling back: {}", message);
                    // The unwind skipped diesel's own rollback.
                    if let Err(e) = AnsiTransactionManager::rollback_transaction(&mut *conn) {
                        warn!("Rollback after panic failed, replacing connection: {}", e);
                        match pool.get() {
                            Ok(fresh) => conn = fresh,
                            Err(e) => error!("Writer actor could not replace its connection: {}", e),
                        }
                    }
                    Err(Error::Unexpected(format!("write job panicked: {}", message)))
                }
            };

            if let Err(e) = &result {
                debug!("Write job rolled back: {}", e);
            }

            // The requester may have given up waiting.
            let _ = reply_tx.send(result);
        }
        debug!("Writer actor stopped");
    });

    WriteHandle { tx }
}
