//! Room service.
//!
//! `RoomService` sequences store calls for every room operation:
//! 1. Resolves the building from its code.
//! 2. For get/update/delete, resolves the room from its number within
//!    that building.
//! 3. Performs the read or write and returns a typed result.
//!
//! Nothing is cached; every call re-reads the store.

use std::sync::Arc;

use db::{DocId, DocumentStore, StoreError};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::models::{
    buildings_collection, rooms_collection, BuildingRef, Room, RoomDetails, RoomUpdate, StoredRoom,
    BUILDING_CODE_FIELD, ROOM_NUMBER_FIELD,
};
use crate::RoomError;

/// Room CRUD over an injected [`DocumentStore`].
///
/// Cheap to clone; clones share the same store handle.
#[derive(Clone)]
pub struct RoomService {
    store: Arc<dyn DocumentStore>,
}

impl RoomService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Resolve a building from its code.
    ///
    /// When several buildings share the code, the last one in the store's
    /// iteration order wins.
    #[instrument(skip(self))]
    pub async fn find_building_by_code(&self, code: &str) -> Result<Option<BuildingRef>, RoomError> {
        let matches = self
            .store
            .find_where(&buildings_collection(), BUILDING_CODE_FIELD, &Value::from(code))
            .await?;

        if matches.len() > 1 {
            warn!(count = matches.len(), "building code is not unique, using the last match");
        }
        matches.into_iter().last().map(BuildingRef::try_from).transpose()
    }

    /// Resolve a room from its number, scoped to one building.
    ///
    /// Same last-match policy as [`Self::find_building_by_code`].
    #[instrument(skip(self, building_id), fields(building_id = %building_id))]
    pub async fn find_room_by_number(
        &self,
        building_id: &DocId,
        number: &str,
    ) -> Result<Option<StoredRoom>, RoomError> {
        let matches = self
            .store
            .find_where(&rooms_collection(building_id), ROOM_NUMBER_FIELD, &Value::from(number))
            .await?;

        if matches.len() > 1 {
            warn!(count = matches.len(), "room number is not unique, using the last match");
        }
        matches.into_iter().last().map(StoredRoom::try_from).transpose()
    }

    async fn require_building(&self, code: &str) -> Result<BuildingRef, RoomError> {
        self.find_building_by_code(code)
            .await?
            .ok_or_else(|| RoomError::BuildingNotFound(code.to_owned()))
    }

    async fn require_room(&self, building: &BuildingRef, number: &str) -> Result<StoredRoom, RoomError> {
        self.find_room_by_number(&building.id, number)
            .await?
            .ok_or_else(|| RoomError::RoomNotFound {
                building: building.building.code.clone(),
                number: number.to_owned(),
            })
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Every room of the building, in store order, without internal ids.
    #[instrument(skip(self))]
    pub async fn list_rooms(&self, building_code: &str) -> Result<Vec<Room>, RoomError> {
        let building = self.require_building(building_code).await?;

        let docs = self.store.list(&rooms_collection(&building.id)).await?;
        let rooms = docs
            .into_iter()
            .map(|doc| serde_json::from_value::<Room>(doc.data))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = rooms.len(), "rooms listed");
        Ok(rooms)
    }

    /// The room's stored document, including fields outside the room schema.
    #[instrument(skip(self))]
    pub async fn get_room(&self, building_code: &str, number: &str) -> Result<RoomDetails, RoomError> {
        let building = self.require_building(building_code).await?;
        let stored = self.require_room(&building, number).await?;
        Ok(stored.details)
    }

    /// Insert a new room, rejecting a number already used in the building.
    ///
    /// The duplicate check and the insert are one conditional write, so two
    /// concurrent creates of the same number cannot both succeed. Returns
    /// only after the store has acknowledged the insert.
    #[instrument(skip(self, room), fields(number = %room.number))]
    pub async fn create_room(&self, building_code: &str, room: Room) -> Result<DocId, RoomError> {
        room.validate()?;
        let building = self.require_building(building_code).await?;

        let data = serde_json::to_value(&room)?;
        let id = self
            .store
            .add_unless_exists(&rooms_collection(&building.id), ROOM_NUMBER_FIELD, data)
            .await?
            .ok_or_else(|| RoomError::DuplicateRoom(room.number.clone()))?;

        info!(%id, "room created");
        Ok(id)
    }

    /// Overwrite the type and capacity of an existing room.
    #[instrument(skip(self, update))]
    pub async fn update_room(
        &self,
        building_code: &str,
        number: &str,
        update: RoomUpdate,
    ) -> Result<(), RoomError> {
        update.validate()?;
        let building = self.require_building(building_code).await?;
        let stored = self.require_room(&building, number).await?;

        let collection = rooms_collection(&building.id);
        match self.store.update(&collection, &stored.id, update.into_fields()?).await {
            Ok(()) => {}
            // Deleted between resolution and write.
            Err(StoreError::NotFound { .. }) => {
                return Err(RoomError::RoomNotFound {
                    building: building.building.code,
                    number: number.to_owned(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        info!(id = %stored.id, "room updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_room(&self, building_code: &str, number: &str) -> Result<(), RoomError> {
        let building = self.require_building(building_code).await?;
        let stored = self.require_room(&building, number).await?;

        let collection = rooms_collection(&building.id);
        match self.store.delete(&collection, &stored.id).await {
            Ok(()) => {}
            Err(StoreError::NotFound { .. }) => {
                return Err(RoomError::RoomNotFound {
                    building: building.building.code,
                    number: number.to_owned(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        info!(id = %stored.id, "room deleted");
        Ok(())
    }
}
