//! Identifier generation.

use uuid::Uuid;

pub const TRANSACTION_ID_PREFIX: &str = "txn";
pub const TRIP_ID_PREFIX: &str = "trip";
pub const BID_ID_PREFIX: &str = "bid";
pub const INVESTMENT_ID_PREFIX: &str = "inv";
pub const PLATFORM_FEE_ID_PREFIX: &str = "fee";

/// Generates a prefixed, globally unique identifier.
///
/// UUID v7 embeds a millisecond timestamp ahead of its random bits, so ids
/// sort by creation order.
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::now_v7())
}
