use chrono::{Duration, NaiveDateTime, Utc};

use crate::errors::{Error, Result, ValidationError};

/// Current instant as a naive UTC timestamp, the representation stored in the database.
pub fn now_utc() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// The instant a loan funded at `start` matures.
pub fn maturity_date_from(start: NaiveDateTime, maturity_days: i32) -> Result<NaiveDateTime> {
    start
        .checked_add_signed(Duration::days(i64::from(maturity_days)))
        .ok_or_else(|| {
            Error::Validation(ValidationError::invalid(format!(
                "maturity of {} days is out of range",
                maturity_days
            )))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn maturity_adds_whole_days() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 20)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let maturity = maturity_date_from(start, 10).unwrap();
        assert_eq!(
            maturity,
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn maturity_past_the_calendar_is_an_error() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 20)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(matches!(
            maturity_date_from(start, i32::MAX),
            Err(Error::Validation(_))
        ));
    }
}
