//! Bounded retry for operations that lose an optimistic concurrency race.

use std::future::Future;
use std::time::Duration;

use log::warn;

use crate::errors::Result;

const BACKOFF_STEP_MS: u64 = 5;

/// Runs `op` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` attempts have been made.
///
/// Each attempt re-executes the whole operation from scratch.
pub async fn with_conflict_retry<T, F, Fut>(
    operation: &str,
    max_attempts: u32,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                warn!(
                    "{} hit a concurrency conflict (attempt {}/{}): {}",
                    operation, attempt, max_attempts, e
                );
                tokio::time::sleep(Duration::from_millis(BACKOFF_STEP_MS * u64::from(attempt)))
                    .await;
                attempt += 1;
            }
            other => return other,
        }
    }
}
