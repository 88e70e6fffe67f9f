pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod study;

pub use database::{CardStore, DueFilter, SqliteStore};
pub use error::{ReviewError, StoreError};
pub use models::{Card, CardContent, NextState, Review, ReviewResult};
pub use study::{QueueRequest, ReviewRecorder, StudyMode, StudyQueueBuilder, StudySession};
