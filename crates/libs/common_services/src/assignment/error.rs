use crate::database::DbError;
use thiserror::Error;
use uuid::Uuid;

/// Failure of the crew directory or job store backing the scheduler.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.into())
    }
}

#[derive(Debug, Error)]
pub enum AssignmentError {
    #[error("Assignment for job {0} is already running")]
    AlreadyInProgress(Uuid),

    #[error("Assignment for job {job_id} failed on storage after {rounds} rounds: {source}")]
    Storage {
        job_id: Uuid,
        rounds: u32,
        #[source]
        source: StorageError,
    },
}
