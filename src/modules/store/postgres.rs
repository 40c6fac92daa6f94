//! PostgreSQL-backed stores
//!
//! Documents live in a single `documents` table keyed by `(collection, id)`
//! with the body in a JSONB column. Users live in `users`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{
    Collection, DocumentCheck, DocumentStore, Fields, StoredDocument, UserRecord, UserStore,
};
use crate::core::error::{AppError, Result};

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    data: Json<Fields>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for StoredDocument {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            fields: row.data.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        tracing::error!("{}: {:?}", context, e);
        AppError::Database(e)
    }
}

/// Document store over the `documents` table
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find_all(&self, collection: Collection) -> Result<Vec<StoredDocument>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, data, created_at, updated_at
            FROM documents
            WHERE collection = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list documents"))?;

        Ok(rows.into_iter().map(StoredDocument::from).collect())
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: Uuid,
    ) -> Result<Option<StoredDocument>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, data, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to get document by id"))?;

        Ok(row.map(StoredDocument::from))
    }

    async fn insert_one(&self, collection: Collection, fields: Fields) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO documents (collection, data)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(collection.as_str())
        .bind(Json(fields))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to insert document"))?;

        Ok(id)
    }

    async fn insert_many(&self, collection: Collection, docs: Vec<Fields>) -> Result<u64> {
        if docs.is_empty() {
            return Ok(0);
        }

        let values: Vec<Value> = docs.into_iter().map(Value::Object).collect();

        // Single statement: either every row lands or none do
        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, data)
            SELECT $1, doc FROM UNNEST($2::jsonb[]) AS doc
            "#,
        )
        .bind(collection.as_str())
        .bind(values)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to batch insert documents"))?;

        Ok(result.rows_affected())
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: Uuid,
        partial: Fields,
    ) -> Result<Option<StoredDocument>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            UPDATE documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            RETURNING id, data, created_at, updated_at
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(partial))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update document"))?;

        Ok(row.map(StoredDocument::from))
    }

    async fn delete_many_by_ids(&self, collection: Collection, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = $1 AND id = ANY($2)
            "#,
        )
        .bind(collection.as_str())
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to delete documents"))?;

        Ok(result.rows_affected())
    }

    async fn count(&self, collection: Collection) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = $1")
                .bind(collection.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("Failed to count documents"))?;

        Ok(count.max(0) as u64)
    }

    async fn move_document(
        &self,
        from: Collection,
        id: Uuid,
        to: Collection,
        stamp: Fields,
        check: &DocumentCheck,
    ) -> Result<Option<StoredDocument>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin move transaction"))?;

        let source = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, data, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            FOR UPDATE
            "#,
        )
        .bind(from.as_str())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to read document for move"))?;

        let Some(source) = source else {
            tx.rollback()
                .await
                .map_err(db_error("Failed to roll back move transaction"))?;
            return Ok(None);
        };

        let mut merged = source.data.0;
        merged.extend(stamp);
        if let Err(e) = check(&mut merged) {
            tx.rollback()
                .await
                .map_err(db_error("Failed to roll back move transaction"))?;
            return Err(e);
        }

        let moved = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (id, collection, data, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, data, created_at, updated_at
            "#,
        )
        .bind(source.id)
        .bind(to.as_str())
        .bind(Json(merged))
        .bind(source.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to insert moved document"))?;

        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(from.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete moved document from source"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit move transaction"))?;

        Ok(Some(moved.into()))
    }
}

/// Credential store over the `users` table
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, password_hash, admin, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find user by username"))
    }

    async fn upsert(
        &self,
        username: &str,
        password_hash: &str,
        admin: bool,
    ) -> Result<UserRecord> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (username, password_hash, admin)
            VALUES ($1, $2, $3)
            ON CONFLICT (username)
            DO UPDATE SET password_hash = EXCLUDED.password_hash,
                          admin = EXCLUDED.admin,
                          updated_at = NOW()
            RETURNING id, username, password_hash, admin, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(admin)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to upsert user"))
    }
}
