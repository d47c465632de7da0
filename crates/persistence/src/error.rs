use std::time::Duration;

use domain::DomainError;
use thiserror::Error;

/// Errors raised by the storage adapters before they reach the domain.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Opening a transaction took longer than allowed.
    #[error("Timed out after {0:?} waiting for the database")]
    Timeout(Duration),
}

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        DomainError::persistence(err)
    }
}

/// Maps a raw sqlx error into a domain persistence error.
pub(crate) fn database(err: sqlx::Error) -> DomainError {
    StorageError::Database(err).into()
}

/// Builds an `AlreadyExists` error and records it as a storage conflict.
pub(crate) fn conflict(entity: &'static str, id: impl ToString) -> DomainError {
    metrics::counter!("storage_conflicts", "entity" => entity).increment(1);
    DomainError::already_exists(entity, id)
}
