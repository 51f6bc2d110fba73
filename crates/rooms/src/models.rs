//! Building and room documents.
//!
//! Field names follow the documents already stored by the campus system
//! (`codigoDoPredio`, `numeroDaSala`, …); the same names are used on the
//! wire.

use db::{CollectionPath, DocId, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::RoomError;

// ---------------------------------------------------------------------------
// Collection layout
// ---------------------------------------------------------------------------

pub const BUILDINGS_COLLECTION: &str = "predios";
pub const ROOMS_COLLECTION: &str = "salas";

pub const BUILDING_CODE_FIELD: &str = "codigoDoPredio";
pub const ROOM_NUMBER_FIELD: &str = "numeroDaSala";

pub fn buildings_collection() -> CollectionPath {
    CollectionPath::root(BUILDINGS_COLLECTION)
}

/// The rooms sub-collection owned by building `building_id`.
pub fn rooms_collection(building_id: &DocId) -> CollectionPath {
    buildings_collection().nested(building_id, ROOMS_COLLECTION)
}

fn require_text(field: &str, value: &str) -> Result<(), RoomError> {
    if value.trim().is_empty() {
        return Err(RoomError::Invalid(format!("'{field}' must not be blank")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Building document. Other fields of the stored document are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// Human-assigned campus code, e.g. `"B1"`.
    #[serde(rename = "codigoDoPredio")]
    pub code: String,
}

impl Building {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    pub fn validate(&self) -> Result<(), RoomError> {
        require_text(BUILDING_CODE_FIELD, &self.code)
    }
}

/// A resolved building: its store id plus its document.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingRef {
    pub id: DocId,
    pub building: Building,
}

impl TryFrom<Document> for BuildingRef {
    type Error = RoomError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        Ok(Self {
            id: doc.id,
            building: serde_json::from_value(doc.data)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// Room document, and the body of a create request.
///
/// Deserializing a stored document into `Room` drops every other field,
/// which is exactly the projection the list endpoint returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique within the owning building; immutable once created.
    #[serde(rename = "numeroDaSala")]
    pub number: String,
    /// Free-form category such as `"lab"` or `"classroom"`.
    #[serde(rename = "tipoDeSala")]
    pub room_type: String,
    /// Number of occupants.
    #[serde(rename = "capacidadeDeAlunos")]
    pub capacity: u32,
}

impl Room {
    pub fn new(number: impl Into<String>, room_type: impl Into<String>, capacity: u32) -> Self {
        Self {
            number: number.into(),
            room_type: room_type.into(),
            capacity,
        }
    }

    pub fn validate(&self) -> Result<(), RoomError> {
        require_text(ROOM_NUMBER_FIELD, &self.number)?;
        require_text("tipoDeSala", &self.room_type)
    }
}

/// Every stored field of a room document, as returned by the get endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDetails {
    #[serde(flatten)]
    pub room: Room,
    /// Fields outside the room schema, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A resolved room: its store id plus its document.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRoom {
    pub id: DocId,
    pub details: RoomDetails,
}

impl TryFrom<Document> for StoredRoom {
    type Error = RoomError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        Ok(Self {
            id: doc.id,
            details: serde_json::from_value(doc.data)?,
        })
    }
}

/// Body of an update request. The room number cannot be changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomUpdate {
    #[serde(rename = "tipoDeSala")]
    pub room_type: String,
    #[serde(rename = "capacidadeDeAlunos")]
    pub capacity: u32,
}

impl RoomUpdate {
    pub fn validate(&self) -> Result<(), RoomError> {
        require_text("tipoDeSala", &self.room_type)
    }

    /// The fields to merge into the stored document.
    pub fn into_fields(self) -> Result<Map<String, Value>, RoomError> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(RoomError::Invalid(format!("unexpected update shape: {other}"))),
        }
    }
}
