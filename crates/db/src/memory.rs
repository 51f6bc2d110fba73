//! In-process `DocumentStore`.
//!
//! Keeps every collection as an insertion-ordered `Vec` behind a single
//! `RwLock`. Used by the `serve --store memory` mode and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::store::{object_fields, CollectionPath, DocId, Document, DocumentStore};
use crate::StoreError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<CollectionPath, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of documents in `collection`.
    pub async fn len(&self, collection: &CollectionPath) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

fn not_found(collection: &CollectionPath, id: &DocId) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: *id,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_where(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        let matches: Vec<Document> = guard
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| doc.data.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(matches)
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard.get(collection).cloned().unwrap_or_default())
    }

    async fn add(&self, collection: &CollectionPath, data: Value) -> Result<DocId, StoreError> {
        let fields = object_fields(data)?;
        let id = DocId::new();
        self.collections
            .write()
            .await
            .entry(collection.clone())
            .or_default()
            .push(Document { id, data: Value::Object(fields) });
        debug!(%collection, %id, "document added");
        Ok(id)
    }

    async fn add_unless_exists(
        &self,
        collection: &CollectionPath,
        field: &str,
        data: Value,
    ) -> Result<Option<DocId>, StoreError> {
        let fields = object_fields(data)?;
        let key = fields.get(field).cloned().ok_or_else(|| {
            StoreError::InvalidDocument(format!("missing key field '{field}'"))
        })?;

        // One write guard covers both the existence check and the push.
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection.clone()).or_default();
        if docs.iter().any(|doc| doc.data.get(field) == Some(&key)) {
            debug!(%collection, field, "conditional insert blocked by existing document");
            return Ok(None);
        }

        let id = DocId::new();
        docs.push(Document { id, data: Value::Object(fields) });
        debug!(%collection, %id, "document added");
        Ok(Some(id))
    }

    async fn update(
        &self,
        collection: &CollectionPath,
        id: &DocId,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        let doc = guard
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == *id))
            .ok_or_else(|| not_found(collection, id))?;

        if let Value::Object(existing) = &mut doc.data {
            existing.extend(fields);
        }
        debug!(%collection, %id, "document updated");
        Ok(())
    }

    async fn delete(&self, collection: &CollectionPath, id: &DocId) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        let docs = guard
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, id))?;
        let before = docs.len();
        docs.retain(|doc| doc.id != *id);
        if docs.len() == before {
            return Err(not_found(collection, id));
        }
        debug!(%collection, %id, "document deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;

    fn rooms() -> CollectionPath {
        CollectionPath::root("predios").nested(&DocId::new(), "salas")
    }

    #[tokio::test]
    async fn find_where_returns_matches_in_insertion_order() {
        let store = MemoryStore::new();
        let coll = rooms();
        let first = store.add(&coll, json!({ "n": "1", "tag": "a" })).await.unwrap();
        store.add(&coll, json!({ "n": "2", "tag": "b" })).await.unwrap();
        let third = store.add(&coll, json!({ "n": "1", "tag": "c" })).await.unwrap();

        let hits = store.find_where(&coll, "n", &json!("1")).await.unwrap();
        let ids: Vec<DocId> = hits.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![first, third]);
    }

    #[tokio::test]
    async fn find_where_does_not_coerce_types() {
        let store = MemoryStore::new();
        let coll = rooms();
        store.add(&coll, json!({ "n": 1 })).await.unwrap();

        assert!(store.find_where(&coll, "n", &json!("1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_collection_reads_as_empty() {
        let store = MemoryStore::new();
        assert!(store.list(&rooms()).await.unwrap().is_empty());
        assert!(store
            .find_where(&rooms(), "n", &json!("1"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn nested_collections_are_isolated() {
        let store = MemoryStore::new();
        let a = rooms();
        let b = rooms();
        store.add(&a, json!({ "n": "1" })).await.unwrap();

        assert_eq!(store.len(&a).await, 1);
        assert_eq!(store.len(&b).await, 0);
    }

    #[tokio::test]
    async fn non_object_documents_are_rejected() {
        let store = MemoryStore::new();
        let err = store.add(&rooms(), json!([1, 2])).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument(_)));
    }

    #[tokio::test]
    async fn add_unless_exists_blocks_duplicates() {
        let store = MemoryStore::new();
        let coll = rooms();
        let created = store
            .add_unless_exists(&coll, "n", json!({ "n": "7" }))
            .await
            .unwrap();
        assert!(created.is_some());

        let blocked = store
            .add_unless_exists(&coll, "n", json!({ "n": "7", "other": true }))
            .await
            .unwrap();
        assert!(blocked.is_none());
        assert_eq!(store.len(&coll).await, 1);
    }

    #[tokio::test]
    async fn add_unless_exists_requires_key_field() {
        let store = MemoryStore::new();
        let err = store
            .add_unless_exists(&rooms(), "n", json!({ "other": 1 }))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument(_)));
    }

    #[tokio::test]
    async fn concurrent_conditional_inserts_admit_one() {
        let store = Arc::new(MemoryStore::new());
        let coll = rooms();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let coll = coll.clone();
                tokio::spawn(async move {
                    store
                        .add_unless_exists(&coll, "n", json!({ "n": "42" }))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.len(&coll).await, 1);
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let store = MemoryStore::new();
        let coll = rooms();
        let id = store
            .add(&coll, json!({ "n": "1", "kind": "lab", "size": 10 }))
            .await
            .unwrap();

        let mut patch = Map::new();
        patch.insert("kind".into(), json!("office"));
        store.update(&coll, &id, patch).await.unwrap();

        let docs = store.list(&coll).await.unwrap();
        assert_eq!(docs[0].data, json!({ "n": "1", "kind": "office", "size": 10 }));
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_document_fail() {
        let store = MemoryStore::new();
        let coll = rooms();
        let ghost = DocId::new();

        let err = store.update(&coll, &ghost, Map::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let err = store.delete(&coll, &ghost).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_removes_only_the_target() {
        let store = MemoryStore::new();
        let coll = rooms();
        let keep = store.add(&coll, json!({ "n": "1" })).await.unwrap();
        let gone = store.add(&coll, json!({ "n": "2" })).await.unwrap();

        store.delete(&coll, &gone).await.unwrap();

        let docs = store.list(&coll).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, keep);
    }
}
