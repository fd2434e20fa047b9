//! SQLite document store adapter.
//!
//! Documents live as JSON text in a single `documents` table keyed by
//! `(collection, id)`; `seq` preserves insertion order.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use uuid::Uuid;

use storefront_types::{
    Collection, DeleteResult, Document, DocumentStore, Filter, ID_FIELD, InsertResult, RecordId,
    RepoError, UpdateResult,
};

use crate::types::{DbDocument, json_path};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:");

        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if !in_memory {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // A private in-memory database exists once per connection
        let max_connections = if in_memory { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema (idempotent).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        let ddl = include_str!("../migrations/0001_create_documents.sql");
        sqlx::raw_sql(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(())
    }
}

fn parse_id(id: &RecordId) -> Result<String, RepoError> {
    Uuid::parse_str(id.as_str())
        .map(|uuid| uuid.to_string())
        .map_err(|_| RepoError::InvalidId(id.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl DocumentStore for SqliteRepo {
    #[tracing::instrument(skip(self, doc))]
    async fn insert_one(
        &self,
        collection: Collection,
        mut doc: Document,
    ) -> Result<InsertResult, RepoError> {
        doc.remove(ID_FIELD);

        let id = Uuid::new_v4().to_string();
        let body =
            serde_json::to_string(&doc).map_err(|e| RepoError::Serialization(e.to_string()))?;
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO documents (collection, id, body, created_at, updated_at) VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(collection.name())
        .bind(&id)
        .bind(&body)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(InsertResult {
            inserted_id: RecordId::new(id),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn find_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Option<Document>, RepoError> {
        let row: Option<DbDocument> = match &filter {
            Filter::Id(id) => {
                let id = parse_id(id)?;
                sqlx::query_as(r#"SELECT id, body FROM documents WHERE collection = ? AND id = ?"#)
                    .bind(collection.name())
                    .bind(&id)
                    .fetch_optional(&self.pool)
                    .await
            }
            Filter::Eq { field, value } => {
                sqlx::query_as(
                    r#"SELECT id, body FROM documents WHERE collection = ? AND json_extract(body, ?) = ? ORDER BY seq LIMIT 1"#,
                )
                .bind(collection.name())
                .bind(json_path(field))
                .bind(value)
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbDocument::into_document).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn find(
        &self,
        collection: Collection,
        filter: Option<Filter>,
    ) -> Result<Vec<Document>, RepoError> {
        let rows: Vec<DbDocument> = match &filter {
            None => {
                sqlx::query_as(r#"SELECT id, body FROM documents WHERE collection = ? ORDER BY seq"#)
                    .bind(collection.name())
                    .fetch_all(&self.pool)
                    .await
            }
            Some(Filter::Id(id)) => {
                let id = parse_id(id)?;
                sqlx::query_as(r#"SELECT id, body FROM documents WHERE collection = ? AND id = ?"#)
                    .bind(collection.name())
                    .bind(&id)
                    .fetch_all(&self.pool)
                    .await
            }
            Some(Filter::Eq { field, value }) => {
                sqlx::query_as(
                    r#"SELECT id, body FROM documents WHERE collection = ? AND json_extract(body, ?) = ? ORDER BY seq"#,
                )
                .bind(collection.name())
                .bind(json_path(field))
                .bind(value)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbDocument::into_document).collect()
    }

    #[tracing::instrument(skip(self, set))]
    async fn update_one(
        &self,
        collection: Collection,
        filter: Filter,
        mut set: Document,
    ) -> Result<UpdateResult, RepoError> {
        set.remove(ID_FIELD);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        let row: Option<DbDocument> = match &filter {
            Filter::Id(id) => {
                let id = parse_id(id)?;
                sqlx::query_as(r#"SELECT id, body FROM documents WHERE collection = ? AND id = ?"#)
                    .bind(collection.name())
                    .bind(&id)
                    .fetch_optional(&mut *tx)
                    .await
            }
            Filter::Eq { field, value } => {
                sqlx::query_as(
                    r#"SELECT id, body FROM documents WHERE collection = ? AND json_extract(body, ?) = ? ORDER BY seq LIMIT 1"#,
                )
                .bind(collection.name())
                .bind(json_path(field))
                .bind(value)
                .fetch_optional(&mut *tx)
                .await
            }
        }
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let Some(row) = row else {
            return Ok(UpdateResult::default());
        };

        let mut fields = row.fields()?;
        let mut changed = false;
        for (key, value) in set {
            if fields.get(&key) != Some(&value) {
                fields.insert(key, value);
                changed = true;
            }
        }

        if !changed {
            return Ok(UpdateResult {
                matched_count: 1,
                modified_count: 0,
            });
        }

        let body =
            serde_json::to_string(&fields).map_err(|e| RepoError::Serialization(e.to_string()))?;
        sqlx::query(
            r#"UPDATE documents SET body = ?, updated_at = ? WHERE collection = ? AND id = ?"#,
        )
        .bind(&body)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(collection.name())
        .bind(&row.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(UpdateResult {
            matched_count: 1,
            modified_count: 1,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn delete_one(
        &self,
        collection: Collection,
        id: RecordId,
    ) -> Result<DeleteResult, RepoError> {
        let id = parse_id(&id)?;

        let result = sqlx::query(r#"DELETE FROM documents WHERE collection = ? AND id = ?"#)
            .bind(collection.name())
            .bind(&id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(DeleteResult {
            deleted_count: result.rows_affected(),
        })
    }
}
