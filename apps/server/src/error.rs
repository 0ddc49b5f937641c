use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use freightfin_core::errors::Error as CoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::InsufficientFunds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::InvalidTransition { .. } | CoreError::ConstraintViolation(_) => {
            StatusCode::CONFLICT
        }
        CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::Validation(_) | CoreError::InvalidConfigValue(_) => StatusCode::BAD_REQUEST,
        CoreError::ConcurrencyConflict(_) => StatusCode::SERVICE_UNAVAILABLE,
        CoreError::Database(_) | CoreError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Core(e) => core_status(e),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use freightfin_core::errors::{DatabaseError, ValidationError};
    use freightfin_core::money::Money;
    use freightfin_core::wallets::WalletField;

    #[test]
    fn taxonomy_maps_onto_status_codes() {
        let cases = [
            (
                CoreError::InsufficientFunds {
                    field: WalletField::Balance,
                    required: Money::from_minor(10),
                    available: Money::ZERO,
                },
                422,
            ),
            (CoreError::invalid_transition("pending", "repaid"), 409),
            (CoreError::ConstraintViolation("dup".into()), 409),
            (CoreError::not_found("Trip", "t1"), 404),
            (
                CoreError::Validation(ValidationError::invalid("amount must be positive")),
                400,
            ),
            (CoreError::ConcurrencyConflict("wallet moved".into()), 503),
            (
                CoreError::Database(DatabaseError::QueryFailed("disk".into())),
                500,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(core_status(&err).as_u16(), expected, "{}", err);
        }
    }
}
