use diesel::result::{ConnectionError, DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Errors surfaced by the data-access layer.
///
/// A missing row is never an error here; lookups return `Option`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database cannot be reached or refused the credentials.
    #[error("connection error: {0}")]
    Connection(String),

    /// A foreign-key, NOT NULL, unique or check constraint rejected a write,
    /// or a value did not fit its column.
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Database(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(kind, info) => match kind {
                DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::NotNullViolation
                | DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::CheckViolation => {
                    StoreError::Constraint(info.message().to_string())
                }
                DatabaseErrorKind::ClosedConnection => {
                    StoreError::Connection(info.message().to_string())
                }
                // Diesel has no kind for SQLSTATE 22001 (string data right truncation).
                DatabaseErrorKind::Unknown if is_length_violation(info.message()) => {
                    StoreError::Constraint(info.message().to_string())
                }
                _ => StoreError::Database(info.message().to_string()),
            },
            other @ DieselError::BrokenTransactionManager => StoreError::Connection(other.to_string()),
            other => StoreError::Database(other.to_string()),
        }
    }
}

fn is_length_violation(message: &str) -> bool {
    message.starts_with("value too long for type")
}

impl From<ConnectionError> for StoreError {
    fn from(err: ConnectionError) -> Self {
        StoreError::Connection(err.to_string())
    }
}

impl From<diesel::r2d2::PoolError> for StoreError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        StoreError::Connection(err.to_string())
    }
}
