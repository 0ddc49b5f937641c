//! Error taxonomy shared by every ledger crate.
//!
//! Nothing here knows about SQLite; the storage crate folds its own failures
//! into [`DatabaseError`] or, for lock contention, [`Error::ConcurrencyConflict`].

use thiserror::Error;

use crate::money::Money;
use crate::wallets::WalletField;

pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the ledger.
///
/// Business-rule violations (`InsufficientFunds`, `InvalidTransition`,
/// `NotFound`, `Validation`, `ConstraintViolation`) are kept apart from
/// infrastructure failures (`Database`, `ConcurrencyConflict`, `Unexpected`)
/// so adapters can choose between client and server error responses.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Insufficient {field}: required {required}, available {available}")]
    InsufficientFunds {
        field: WalletField,
        required: Money,
        available: Money,
    },

    #[error("Invalid status transition from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Concurrent modification detected: {0}")]
    ConcurrencyConflict(String),

    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        Error::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// True when the caller asked for something the business rules forbid.
    pub fn is_business_rule_violation(&self) -> bool {
        matches!(
            self,
            Error::InsufficientFunds { .. }
                | Error::InvalidTransition { .. }
                | Error::NotFound { .. }
                | Error::Validation(_)
                | Error::ConstraintViolation(_)
        )
    }

    /// True when the whole operation may be retried from scratch.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::ConcurrencyConflict(_))
    }
}

/// Storage failures, flattened to strings at the crate boundary.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// Duplicate key, e.g. a second idempotency record or a reused sequence.
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Rows that no longer parse, a dead writer, or anything else unexpected.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Rejected caller input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

impl ValidationError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ValidationError::InvalidInput(msg.into())
    }
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Unexpected(format!("JSON (de)serialization failed: {}", err))
    }
}
