//! `rooms` crate: building/room domain models and the room service.

pub mod buildings;
pub mod error;
pub mod models;
pub mod service;

pub use buildings::insert_building;
pub use error::RoomError;
pub use models::{Building, BuildingRef, Room, RoomDetails, RoomUpdate, StoredRoom};
pub use service::RoomService;
