use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use freightfin_core::fees::PlatformFee;
use freightfin_core::money::Money;

use crate::utils::{decimal_to_text, parse_column, parse_decimal};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::platform_fees)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PlatformFeeDB {
    pub id: String,
    pub trip_id: String,
    pub lender_id: String,
    pub borrower_id: String,
    pub loan_amount: i64,
    pub fee_percentage: String,
    pub fee_amount: i64,
    pub fee_bearer: String,
    pub platform_transaction_id: Option<String>,
    pub payer_transaction_id: Option<String>,
    pub collected_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl From<&PlatformFee> for PlatformFeeDB {
    fn from(fee: &PlatformFee) -> Self {
        Self {
            id: fee.id.clone(),
            trip_id: fee.trip_id.clone(),
            lender_id: fee.lender_id.clone(),
            borrower_id: fee.borrower_id.clone(),
            loan_amount: fee.loan_amount.minor(),
            fee_percentage: decimal_to_text(fee.fee_percentage),
            fee_amount: fee.fee_amount.minor(),
            fee_bearer: fee.fee_bearer.as_str().to_string(),
            platform_transaction_id: fee.platform_transaction_id.clone(),
            payer_transaction_id: fee.payer_transaction_id.clone(),
            collected_at: fee.collected_at,
            created_at: fee.created_at,
        }
    }
}

impl TryFrom<PlatformFeeDB> for PlatformFee {
    type Error = freightfin_core::Error;

    fn try_from(db: PlatformFeeDB) -> Result<Self, Self::Error> {
        Ok(Self {
            fee_percentage: parse_decimal("platform_fees.fee_percentage", &db.fee_percentage)?,
            fee_bearer: parse_column("platform_fees.fee_bearer", &db.fee_bearer)?,
            id: db.id,
            trip_id: db.trip_id,
            lender_id: db.lender_id,
            borrower_id: db.borrower_id,
            loan_amount: Money::from_minor(db.loan_amount),
            fee_amount: Money::from_minor(db.fee_amount),
            platform_transaction_id: db.platform_transaction_id,
            payer_transaction_id: db.payer_transaction_id,
            collected_at: db.collected_at,
            created_at: db.created_at,
        })
    }
}
