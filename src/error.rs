// src/error.rs

use std::fmt;

/// Crate-wide error enum for the content store.
///
/// `Denied` is kept distinct from `NotFound` so callers can render
/// "forbidden" rather than "missing". `CounterMaintenance` is never returned
/// by a public operation: the reply counter is a denormalization that can
/// always be rederived, so a failed recompute is logged and the primary
/// write stands.
#[derive(Debug)]
pub enum BoardError {
    /// Content failed validation before any write was attempted.
    Validation(String),

    /// A reply targeted a parent post that does not exist.
    ParentNotFound,

    /// The target post does not exist or is already tombstoned.
    NotFound,

    /// The requester is not allowed to perform the operation.
    Denied,

    /// Underlying store I/O failure. Fatal to the request, not retried.
    Persistence(String),

    /// Reply-count recompute failed after a successful primary write.
    CounterMaintenance(String),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::Validation(msg) => write!(f, "validation failed: {}", msg),
            BoardError::ParentNotFound => write!(f, "parent post not found"),
            BoardError::NotFound => write!(f, "post not found"),
            BoardError::Denied => write!(f, "operation not permitted"),
            BoardError::Persistence(msg) => write!(f, "persistence error: {}", msg),
            BoardError::CounterMaintenance(msg) => {
                write!(f, "reply count maintenance failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for BoardError {}

/// Allows using the `?` operator on database queries.
impl From<sqlx::Error> for BoardError {
    fn from(err: sqlx::Error) -> Self {
        BoardError::Persistence(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for BoardError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        BoardError::Persistence(err.to_string())
    }
}
