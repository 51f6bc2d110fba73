//! The store-client interface.
//!
//! Models a hierarchical document database: collections are addressed by a
//! slash-separated path (`predios/<id>/salas`), documents are JSON objects
//! with a store-assigned id. Every adapter implements [`DocumentStore`] and
//! nothing above this crate talks to a concrete backend.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::StoreError;

// ---------------------------------------------------------------------------
// Identifiers and paths
// ---------------------------------------------------------------------------

/// Opaque, store-assigned document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(Uuid);

impl DocId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DocId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for DocId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Path of a collection, root-level or nested under a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// A top-level collection such as `predios`.
    pub fn root(name: &str) -> Self {
        Self(name.to_owned())
    }

    /// A sub-collection owned by document `id` of this collection.
    pub fn nested(&self, id: &DocId, name: &str) -> Self {
        Self(format!("{}/{}/{}", self.0, id, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// One entry of a query snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocId,
    /// Always a JSON object.
    pub data: Value,
}

/// Extract the object map of a document about to be written.
pub(crate) fn object_fields(data: Value) -> Result<Map<String, Value>, StoreError> {
    match data {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// DocumentStore
// ---------------------------------------------------------------------------

/// Primitives the services rely on.
///
/// Snapshots (`find_where`, `list`) are returned in the store's iteration
/// order, which for the bundled adapters is insertion order.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of `collection` whose `field` equals `value`.
    async fn find_where(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError>;

    /// Every document of `collection`.
    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError>;

    /// Insert `data` and return the id the store assigned to it.
    async fn add(&self, collection: &CollectionPath, data: Value) -> Result<DocId, StoreError>;

    /// Insert `data` unless a document with the same value for `field`
    /// already exists in `collection`. The check and the insert are atomic.
    ///
    /// Returns `Ok(None)` when an existing document blocked the insert.
    async fn add_unless_exists(
        &self,
        collection: &CollectionPath,
        field: &str,
        data: Value,
    ) -> Result<Option<DocId>, StoreError>;

    /// Merge `fields` into document `id`. Fields not named are left untouched.
    ///
    /// Returns `StoreError::NotFound` if the document does not exist.
    async fn update(
        &self,
        collection: &CollectionPath,
        id: &DocId,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Remove document `id`.
    ///
    /// Returns `StoreError::NotFound` if the document does not exist.
    async fn delete(&self, collection: &CollectionPath, id: &DocId) -> Result<(), StoreError>;
}
