//! Error types for database operations

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, DbError>;

impl From<DbError> for roster_core::Error {
    fn from(err: DbError) -> Self {
        roster_core::Error::internal(err)
    }
}

/// Convert a query failure into the core taxonomy
pub(crate) fn internal(err: sqlx::Error) -> roster_core::Error {
    DbError::from(err).into()
}

/// Check whether a query failed on a UNIQUE or PRIMARY KEY constraint
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
