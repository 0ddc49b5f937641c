//! Idempotency keys for lifecycle operations.
//!
//! A client retrying after a timeout must not apply an operation twice. Each
//! operation derives a key from its natural identity (or from a key supplied
//! by the caller), and the outcome of the first successful run is stored under
//! it in the same unit of work as the money movement.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::Result;

/// Outcome of a committed operation, stored under its idempotency key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdempotencyRecord {
    pub key: String,
    pub operation: String,
    /// JSON-encoded outcome returned to replays.
    pub outcome: String,
    pub created_at: NaiveDateTime,
}

pub trait IdempotencyStore {
    fn get_idempotency_record(&mut self, key: &str) -> Result<Option<IdempotencyRecord>>;

    fn insert_idempotency_record(&mut self, record: &IdempotencyRecord) -> Result<()>;
}

/// Hashes `operation` and its identifying `parts` into a stable key.
///
/// Parts are separated so that `("ab", "c")` and `("a", "bc")` differ.
pub fn compute_idempotency_key(operation: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    for part in parts {
        hasher.update(b"|");
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_produce_same_key() {
        let a = compute_idempotency_key("repay", &["trip-1"]);
        let b = compute_idempotency_key("repay", &["trip-1"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn operation_and_part_boundaries_matter() {
        assert_ne!(
            compute_idempotency_key("repay", &["trip-1"]),
            compute_idempotency_key("accept_bid", &["trip-1"])
        );
        assert_ne!(
            compute_idempotency_key("accept_bid", &["ab", "c"]),
            compute_idempotency_key("accept_bid", &["a", "bc"])
        );
    }
}
