//! `DocumentStore` over a single Postgres `documents` table.
//!
//! Each row carries its full collection path and a JSONB body; equality
//! queries compare the JSONB value of one top-level key. `seq` gives the
//! insertion order that snapshots are returned in.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::FromRow;
use tracing::debug;
use uuid::Uuid;

use crate::pool::DbPool;
use crate::store::{object_fields, CollectionPath, DocId, Document, DocumentStore};
use crate::StoreError;

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    data: Json<Value>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id.into(),
            data: row.data.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn not_found(collection: &CollectionPath, id: &DocId) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: *id,
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find_where(
        &self,
        collection: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, data FROM documents
            WHERE collection = $1 AND data -> $2::text = $3
            ORDER BY seq
            "#,
        )
        .bind(collection.as_str())
        .bind(field)
        .bind(Json(value.clone()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"SELECT id, data FROM documents WHERE collection = $1 ORDER BY seq"#,
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn add(&self, collection: &CollectionPath, data: Value) -> Result<DocId, StoreError> {
        let fields = object_fields(data)?;
        let id = DocId::new();

        sqlx::query(r#"INSERT INTO documents (id, collection, data) VALUES ($1, $2, $3)"#)
            .bind(id.as_uuid())
            .bind(collection.as_str())
            .bind(Json(Value::Object(fields)))
            .execute(&self.pool)
            .await?;

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

        let mut tx = self.pool.begin().await?;

        // Serialises concurrent inserts of the same key; released on commit
        // or rollback.
        sqlx::query(r#"SELECT pg_advisory_xact_lock(hashtext($1))"#)
            .bind(format!("{collection}#{field}={key}"))
            .execute(&mut *tx)
            .await?;

        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM documents
                WHERE collection = $1 AND data -> $2::text = $3
            )
            "#,
        )
        .bind(collection.as_str())
        .bind(field)
        .bind(Json(key))
        .fetch_one(&mut *tx)
        .await?;

        if exists {
            tx.rollback().await?;
            debug!(%collection, field, "conditional insert blocked by existing document");
            return Ok(None);
        }

        let id = DocId::new();
        sqlx::query(r#"INSERT INTO documents (id, collection, data) VALUES ($1, $2, $3)"#)
            .bind(id.as_uuid())
            .bind(collection.as_str())
            .bind(Json(Value::Object(fields)))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(%collection, %id, "document added");
        Ok(Some(id))
    }

    async fn update(
        &self,
        collection: &CollectionPath,
        id: &DocId,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"UPDATE documents SET data = data || $3 WHERE collection = $1 AND id = $2"#,
        )
        .bind(collection.as_str())
        .bind(id.as_uuid())
        .bind(Json(Value::Object(fields)))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(collection, id));
        }

        debug!(%collection, %id, "document updated");
        Ok(())
    }

    async fn delete(&self, collection: &CollectionPath, id: &DocId) -> Result<(), StoreError> {
        let result = sqlx::query(r#"DELETE FROM documents WHERE collection = $1 AND id = $2"#)
            .bind(collection.as_str())
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(collection, id));
        }

        debug!(%collection, %id, "document deleted");
        Ok(())
    }
}
