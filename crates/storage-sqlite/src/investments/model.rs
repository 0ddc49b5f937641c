use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use freightfin_core::investments::Investment;
use freightfin_core::money::Money;

use crate::utils::{decimal_to_text, parse_column, parse_decimal};

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::investments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct InvestmentDB {
    pub id: String,
    pub bid_id: String,
    pub trip_id: String,
    pub lender_id: String,
    pub amount: i64,
    pub interest_rate: String,
    pub expected_return: i64,
    pub maturity_date: NaiveDateTime,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<&Investment> for InvestmentDB {
    fn from(investment: &Investment) -> Self {
        Self {
            id: investment.id.clone(),
            bid_id: investment.bid_id.clone(),
            trip_id: investment.trip_id.clone(),
            lender_id: investment.lender_id.clone(),
            amount: investment.amount.minor(),
            interest_rate: decimal_to_text(investment.interest_rate),
            expected_return: investment.expected_return.minor(),
            maturity_date: investment.maturity_date,
            status: investment.status.as_str().to_string(),
            created_at: investment.created_at,
            updated_at: investment.updated_at,
        }
    }
}

impl TryFrom<InvestmentDB> for Investment {
    type Error = freightfin_core::Error;

    fn try_from(db: InvestmentDB) -> Result<Self, Self::Error> {
        Ok(Self {
            interest_rate: parse_decimal("investments.interest_rate", &db.interest_rate)?,
            status: parse_column("investments.status", &db.status)?,
            id: db.id,
            bid_id: db.bid_id,
            trip_id: db.trip_id,
            lender_id: db.lender_id,
            amount: Money::from_minor(db.amount),
            expected_return: Money::from_minor(db.expected_return),
            maturity_date: db.maturity_date,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}
