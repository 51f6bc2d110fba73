//! Room-service error types.

use db::StoreError;
use thiserror::Error;

/// Every way a room operation can fail.
///
/// The HTTP layer picks the status code per operation, so variants carry
/// enough context to build a human-readable message and nothing more.
#[derive(Debug, Error)]
pub enum RoomError {
    // ------ Resolution failures ------

    #[error("no building found with code {0}")]
    BuildingNotFound(String),

    #[error("no room found with number {number} in building {building}")]
    RoomNotFound { building: String, number: String },

    // ------ Write conflicts ------

    #[error("room {0} already exists")]
    DuplicateRoom(String),

    #[error("building {0} already exists")]
    DuplicateBuilding(String),

    /// Rejected before any store call.
    #[error("invalid request: {0}")]
    Invalid(String),

    // ------ Unexpected failures ------

    /// A stored document does not have the expected shape.
    #[error("malformed document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RoomError {
    /// Failures that are not the caller's fault.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Store(_))
    }
}
