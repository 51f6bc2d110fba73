//! Building seeding.
//!
//! Buildings are owned by another part of the campus system; this helper
//! exists so a fresh store can be populated from the CLI and in tests.

use db::{DocId, DocumentStore};
use tracing::info;

use crate::models::{buildings_collection, Building, BUILDING_CODE_FIELD};
use crate::RoomError;

/// Add a building document, refusing a second building with the same code.
pub async fn insert_building(
    store: &dyn DocumentStore,
    building: &Building,
) -> Result<DocId, RoomError> {
    building.validate()?;

    let data = serde_json::to_value(building)?;
    let id = store
        .add_unless_exists(&buildings_collection(), BUILDING_CODE_FIELD, data)
        .await?
        .ok_or_else(|| RoomError::DuplicateBuilding(building.code.clone()))?;

    info!(code = %building.code, %id, "building added");
    Ok(id)
}
