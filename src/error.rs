//! Error types shared by the store and the study operations.
use crate::models::{CardInputError, InvalidResult};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database lock poisoned")]
    LockPoisoned,

    /// A stored value could not be decoded into its model type.
    #[error("corrupt stored value: {0}")]
    Corrupt(String),

    #[error("card not found: {0}")]
    CardNotFound(String),

    #[error("invalid card: {0}")]
    InvalidCard(#[from] CardInputError),
}

/// Failures of `ReviewRecorder`. Each variant is a distinct condition the
/// caller can act on; none leaves the card and its reviews out of sync.
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error(transparent)]
    InvalidResult(#[from] InvalidResult),

    #[error("card not found: {0}")]
    NotFound(String),

    /// The write was rolled back in full and may be retried.
    #[error("failed to record review: {0}")]
    Persistence(#[source] StoreError),
}

impl From<StoreError> for ReviewError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CardNotFound(id) => ReviewError::NotFound(id),
            other => ReviewError::Persistence(other),
        }
    }
}
