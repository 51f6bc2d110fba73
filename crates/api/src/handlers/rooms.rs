use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{ApiError, AppState, RoomOp};
use ::rooms::{Room, RoomDetails, RoomUpdate};

/// Body of every successful write.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Ack {
    fn ok() -> Self {
        Self { success: true, message: None }
    }

    fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(format!("invalid room payload: {}", rejection.body_text())))
}

pub async fn list(
    Path(building_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Room>>, ApiError> {
    match state.rooms.list_rooms(&building_code).await {
        Ok(rooms) => Ok(Json(rooms)),
        Err(e) => Err(state.fail(RoomOp::List, e)),
    }
}

pub async fn get_one(
    Path((building_code, room_number)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<RoomDetails>, ApiError> {
    match state.rooms.get_room(&building_code, &room_number).await {
        Ok(room) => Ok(Json(room)),
        Err(e) => Err(state.fail(RoomOp::Get, e)),
    }
}

pub async fn create(
    Path(building_code): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<Room>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let room = body(payload)?;

    match state.rooms.create_room(&building_code, room).await {
        Ok(_) => Ok(Json(Ack::ok())),
        Err(e) => Err(state.fail(RoomOp::Create, e)),
    }
}

pub async fn update(
    Path((building_code, room_number)): Path<(String, String)>,
    State(state): State<AppState>,
    payload: Result<Json<RoomUpdate>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let update = body(payload)?;

    match state.rooms.update_room(&building_code, &room_number, update).await {
        Ok(()) => Ok(Json(Ack::with_message("room updated"))),
        Err(e) => Err(state.fail(RoomOp::Update, e)),
    }
}

pub async fn delete(
    Path((building_code, room_number)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<Ack>, ApiError> {
    match state.rooms.delete_room(&building_code, &room_number).await {
        Ok(()) => Ok(Json(Ack::with_message(format!("room {room_number} removed")))),
        Err(e) => Err(state.fail(RoomOp::Delete, e)),
    }
}
