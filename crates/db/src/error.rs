//! Typed error type for the db crate.

use thiserror::Error;

use crate::store::DocId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("document {id} not found in '{collection}'")]
    NotFound { collection: String, id: DocId },

    /// The document passed to a write was not a JSON object, or lacked the
    /// field a conditional write keys on.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Failure injected by [`crate::mock::FlakyStore`].
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
