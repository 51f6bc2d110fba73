//! `FlakyStore`: a test double for `DocumentStore`.
//!
//! Delegates to an inner [`MemoryStore`], records every primitive it
//! receives, and fails the primitives it was told to fail. Useful where a
//! test needs a store error on one specific call, or needs to prove that a
//! write never happened.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::memory::MemoryStore;
use crate::store::{CollectionPath, DocId, Document, DocumentStore};
use crate::StoreError;

/// The primitives of [`DocumentStore`], used to script failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    FindWhere,
    List,
    Add,
    AddUnlessExists,
    Update,
    Delete,
}

impl StoreOp {
    pub fn is_write(self) -> bool {
        !matches!(self, Self::FindWhere | Self::List)
    }
}

#[derive(Debug)]
pub struct FlakyStore {
    /// The backing data; seed it directly to bypass failure injection.
    pub inner: Arc<MemoryStore>,
    failing: Mutex<HashSet<StoreOp>>,
    calls: Mutex<Vec<StoreOp>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make every subsequent `op` fail with `StoreError::Unavailable`.
    pub fn fail_on(&self, op: StoreOp) -> &Self {
        lock(&self.failing).insert(op);
        self
    }

    /// Stop failing `op`.
    pub fn heal(&self, op: StoreOp) -> &Self {
        lock(&self.failing).remove(&op);
        self
    }

    /// All primitives seen so far, in call order (failed calls included).
    pub fn calls(&self) -> Vec<StoreOp> {
        lock(&self.calls).clone()
    }

    /// Number of write primitives seen so far.
    pub fn write_count(&self) -> usize {
        lock(&self.calls).iter().filter(|op| op.is_write()).count()
    }

    fn enter(&self, op: StoreOp) -> Result<(), StoreError> {
        lock(&self.calls).push(op);
        if lock(&self.failing).contains(&op) {
            return Err(StoreError::Unavailable(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn find_where(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        self.enter(StoreOp::FindWhere)?;
        self.inner.find_where(collection, field, value).await
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        self.enter(StoreOp::List)?;
        self.inner.list(collection).await
    }

    async fn add(&self, collection: &CollectionPath, data: Value) -> Result<DocId, StoreError> {
        self.enter(StoreOp::Add)?;
        self.inner.add(collection, data).await
    }

    async fn add_unless_exists(
        &self,
        collection: &CollectionPath,
        field: &str,
        data: Value,
    ) -> Result<Option<DocId>, StoreError> {
        self.enter(StoreOp::AddUnlessExists)?;
        self.inner.add_unless_exists(collection, field, data).await
    }

    async fn update(
        &self,
        collection: &CollectionPath,
        id: &DocId,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.enter(StoreOp::Update)?;
        self.inner.update(collection, id, fields).await
    }

    async fn delete(&self, collection: &CollectionPath, id: &DocId) -> Result<(), StoreError> {
        self.enter(StoreOp::Delete)?;
        self.inner.delete(collection, id).await
    }
}
