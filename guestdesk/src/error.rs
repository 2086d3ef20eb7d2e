//! Storage errors and their HTTP mapping.

use guestdesk_web::AppError;
use thiserror::Error;

/// Failure talking to the backing store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Query or connection failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failure
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be decoded
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// Store not reachable (used by the in-memory store to simulate outages)
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        Self::internal("A storage error occurred").with_source(err)
    }
}
