use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{Collection, Document, DocumentStore, Filter};
use crate::errors::AppError;

/// Postgres-backed store: a single `documents` table with a JSONB body.
/// Partial updates use `||` (shallow merge), filters use `@>` containment.
#[derive(Clone)]
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
    async fn insert(&self, collection: Collection, body: Value) -> Result<Document, AppError> {
        if !body.is_object() {
            return Err(AppError::Validation(format!(
                "{} documents must be JSON objects",
                collection.as_str()
            )));
        }
        let doc = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (id, collection, body)
            VALUES ($1, $2, $3)
            RETURNING id, collection, body, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(collection.as_str())
        .bind(&body)
        .fetch_one(&self.pool)
        .await?;

        debug!("insert {} {}", collection.as_str(), doc.id);
        Ok(doc)
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, AppError> {
        Ok(sqlx::query_as::<_, Document>(
            "SELECT id, collection, body, created_at FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn patch(
        &self,
        collection: Collection,
        id: Uuid,
        fields: Value,
    ) -> Result<Document, AppError> {
        if !fields.is_object() {
            return Err(AppError::Validation("patch must be a JSON object".into()));
        }
        let doc = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET body = body || $3
            WHERE collection = $1 AND id = $2
            RETURNING id, collection, body, created_at
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(&fields)
        .fetch_optional(&self.pool)
        .await?;

        debug!("patch {} {}", collection.as_str(), id);
        doc.ok_or_else(|| {
            AppError::NotFound(format!("{} document {id} not found", collection.as_str()))
        })
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!("delete {} {}", collection.as_str(), id);
        Ok(result.rows_affected() > 0)
    }

    async fn list(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, AppError> {
        Ok(sqlx::query_as::<_, Document>(
            r#"
            SELECT id, collection, body, created_at
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(collection.as_str())
        .bind(filter.as_json())
        .fetch_all(&self.pool)
        .await?)
    }
}
