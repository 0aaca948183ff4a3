use thiserror::Error;
use types::{SlotIndex, ValidationError};

/// The four outcomes a caller of the savegame core can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    UniquenessConflict,
    Storage,
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Slot {0} corrupted or does not exist")]
    SlotNotFound(SlotIndex),

    #[error("Uniqueness conflict: {0}")]
    UniquenessConflict(String),

    #[error("Database busy: {0}")]
    Busy(String),

    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Query execution error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Player not found: {0}")]
    PlayerNotFound(String),
}

impl DatabaseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DatabaseError::Validation(_) => ErrorKind::Validation,
            DatabaseError::SlotNotFound(_) => ErrorKind::NotFound,
            DatabaseError::UniquenessConflict(_) => ErrorKind::UniquenessConflict,
            _ => ErrorKind::Storage,
        }
    }

    /// True for failures caused by a concurrent writer; the same request may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DatabaseError::UniquenessConflict(_) | DatabaseError::Busy(_)
        )
    }

    /// Classifies a sqlx error raised while running a statement.
    pub fn from_query(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DatabaseError::UniquenessConflict(db.message().to_string())
            }
            sqlx::Error::Database(db) if is_busy_code(db.code().as_deref()) => {
                DatabaseError::Busy(db.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::Connection(err.to_string())
            }
            _ => DatabaseError::Query(err.to_string()),
        }
    }

    /// Like `from_query`, for errors raised by `begin` or `commit`.
    pub fn from_transaction(err: sqlx::Error) -> Self {
        match DatabaseError::from_query(err) {
            DatabaseError::Query(msg) => DatabaseError::Transaction(msg),
            other => other,
        }
    }
}

// SQLITE_BUSY and SQLITE_LOCKED, including their extended codes.
fn is_busy_code(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok())
        .map(|c| matches!(c & 0xff, 5 | 6))
        .unwrap_or(false)
}
