//! Helpers for mapping stored text columns back to domain values.
//!
//! Enums and decimals are kept as TEXT so rows stay readable in any SQLite
//! client. A value that no longer parses means the row was written by
//! something other than this crate, so it surfaces as a storage error rather
//! than a validation error.

use std::fmt::Display;
use std::str::FromStr;

use freightfin_core::Result;
use rust_decimal::Decimal;

use crate::errors::StorageError;

/// Parses a stored column value, naming the column on failure.
pub fn parse_column<T>(column: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>().map_err(|e| {
        StorageError::Corrupted(format!("{} = '{}': {}", column, raw, e)).into()
    })
}

pub fn parse_decimal(column: &str, raw: &str) -> Result<Decimal> {
    parse_column::<Decimal>(column, raw)
}

pub fn parse_optional_decimal(column: &str, raw: Option<&str>) -> Result<Option<Decimal>> {
    raw.map(|value| parse_decimal(column, value)).transpose()
}

/// Text form of a decimal with trailing zeros removed, so `10.50` and `10.5`
/// are stored identically.
pub fn decimal_to_text(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use freightfin_core::trips::TripStatus;
    use freightfin_core::Error;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_known_values() {
        let status: TripStatus = parse_column("status", "in_transit").unwrap();
        assert_eq!(status, TripStatus::InTransit);
        assert_eq!(parse_decimal("interest_rate", "12.5").unwrap(), dec!(12.5));
        assert_eq!(parse_optional_decimal("interest_rate", None).unwrap(), None);
    }

    #[test]
    fn unknown_values_are_storage_errors() {
        let err = parse_column::<TripStatus>("status", "teleported").unwrap_err();
        assert!(matches!(err, Error::Database(_)));
        assert!(err.to_string().contains("teleported"));
    }

    #[test]
    fn decimals_are_normalised() {
        assert_eq!(decimal_to_text(dec!(10.50)), "10.5");
        assert_eq!(decimal_to_text(dec!(2.00)), "2");
    }
}
