//! `db` crate: pure persistence layer.
//!
//! Provides the [`DocumentStore`] interface the services are written
//! against, plus its adapters: an in-memory store, a failure-injecting test
//! double, and a Postgres-backed store with its pool and migrations.
//! No business logic lives here.

pub mod error;
pub mod memory;
pub mod mock;
pub mod pool;
pub mod postgres;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use pool::DbPool;
pub use postgres::PgStore;
pub use store::{CollectionPath, DocId, Document, DocumentStore};
