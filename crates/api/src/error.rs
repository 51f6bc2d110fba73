//! Mapping of room-service failures to HTTP responses.
//!
//! The status for a missing building or room depends on the operation, so
//! conversion goes through [`ApiError::from_room`] with the [`RoomOp`] that
//! failed rather than a plain `From<RoomError>`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rooms::RoomError;
use tracing::{error, warn};

/// The operation a request was performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomOp {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl RoomOp {
    /// Prefix of the 500 body for this operation.
    pub fn failure_context(self) -> &'static str {
        match self {
            Self::List => "error listing rooms",
            Self::Get => "error fetching room",
            Self::Create => "error inserting room",
            Self::Update => "error updating room",
            Self::Delete => "error removing room",
        }
    }

    fn missing_building_status(self) -> StatusCode {
        match self {
            Self::List | Self::Get | Self::Create => StatusCode::BAD_REQUEST,
            Self::Update | Self::Delete => StatusCode::NOT_FOUND,
        }
    }

    fn missing_room_status(self) -> StatusCode {
        match self {
            // Kept for compatibility with existing clients.
            Self::Update => StatusCode::UNAUTHORIZED,
            _ => StatusCode::NOT_FOUND,
        }
    }
}

/// A request that ended in an error response.
#[derive(Debug)]
pub enum ApiError {
    /// 4xx with a plain-text, human-readable body.
    Rejected { status: StatusCode, message: String },
    /// 500 with a JSON `{"error": ...}` body.
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn from_room(op: RoomOp, err: RoomError, redact: bool) -> Self {
        let (status, message) = match &err {
            RoomError::BuildingNotFound(_) => (op.missing_building_status(), err.to_string()),
            RoomError::RoomNotFound { number, .. } => {
                let message = match op {
                    RoomOp::Get => format!("room {number} does not exist"),
                    _ => format!("no room found with number {number}"),
                };
                (op.missing_room_status(), message)
            }
            // Kept for compatibility with existing clients.
            RoomError::DuplicateRoom(_) => (StatusCode::UNAUTHORIZED, err.to_string()),
            RoomError::DuplicateBuilding(_) => (StatusCode::CONFLICT, err.to_string()),
            RoomError::Invalid(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            RoomError::Decode(_) | RoomError::Store(_) => {
                let context = op.failure_context();
                error!(?op, error = %err, "{context}");
                let message = if redact {
                    context.to_owned()
                } else {
                    format!("{context}: {err}")
                };
                return Self::Internal { message };
            }
        };

        warn!(?op, status = status.as_u16(), "{message}");
        Self::Rejected { status, message }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Rejected { status, .. } => *status,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Rejected { status, message } => (status, message).into_response(),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use db::StoreError;

    use super::*;

    fn not_found_room() -> RoomError {
        RoomError::RoomNotFound {
            building: "B1".into(),
            number: "7".into(),
        }
    }

    #[test]
    fn missing_building_status_depends_on_operation() {
        let status = |op| ApiError::from_room(op, RoomError::BuildingNotFound("B1".into()), false).status();
        assert_eq!(status(RoomOp::List), StatusCode::BAD_REQUEST);
        assert_eq!(status(RoomOp::Get), StatusCode::BAD_REQUEST);
        assert_eq!(status(RoomOp::Create), StatusCode::BAD_REQUEST);
        assert_eq!(status(RoomOp::Update), StatusCode::NOT_FOUND);
        assert_eq!(status(RoomOp::Delete), StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_room_status_depends_on_operation() {
        let status = |op| ApiError::from_room(op, not_found_room(), false).status();
        assert_eq!(status(RoomOp::Get), StatusCode::NOT_FOUND);
        assert_eq!(status(RoomOp::Update), StatusCode::UNAUTHORIZED);
        assert_eq!(status(RoomOp::Delete), StatusCode::NOT_FOUND);
    }

    #[test]
    fn duplicate_room_is_reported_as_401() {
        let err = ApiError::from_room(RoomOp::Create, RoomError::DuplicateRoom("101".into()), false);
        match err {
            ApiError::Rejected { status, message } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert!(message.contains("101"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn store_failures_carry_the_reason_unless_redacted() {
        let store_err = || RoomError::Store(StoreError::Unavailable("disk on fire".into()));

        match ApiError::from_room(RoomOp::Update, store_err(), false) {
            ApiError::Internal { message } => {
                assert!(message.starts_with("error updating room: "));
                assert!(message.contains("disk on fire"));
            }
            other => panic!("unexpected {other:?}"),
        }

        match ApiError::from_room(RoomOp::Update, store_err(), true) {
            ApiError::Internal { message } => assert_eq!(message, "error updating room"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
