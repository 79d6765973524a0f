//! Document store, the persistence seam for every resource in the service.
//!
//! Each call is independently atomic. Nothing here spans more than one
//! document, so cascades built on top are sequences of independent calls
//! with no rollback.
//!
//! `AppState` holds an `Arc<dyn DocumentStore>`: Postgres in production,
//! the in-memory store for tests and for running without `DATABASE_URL`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Users,
    Assessments,
    Courses,
    Categories,
    StudentCategories,
    Chapters,
    Attachments,
    UserProgress,
    Enrollments,
    Onboardings,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Assessments => "assessments",
            Collection::Courses => "courses",
            Collection::Categories => "categories",
            Collection::StudentCategories => "student_categories",
            Collection::Chapters => "chapters",
            Collection::Attachments => "attachments",
            Collection::UserProgress => "user_progress",
            Collection::Enrollments => "enrollments",
            Collection::Onboardings => "onboardings",
        }
    }
}

/// A stored document: system fields plus an opaque JSON body.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub collection: String,
    pub body: Value,
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Decodes the body into a typed record, with `id` and `created_at`
    /// taken from the system fields.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, AppError> {
        let mut body = match self.body {
            Value::Object(map) => map,
            other => {
                return Err(AppError::Internal(anyhow::anyhow!(
                    "document {} in '{}' has a non-object body: {other}",
                    self.id,
                    self.collection
                )))
            }
        };
        body.insert("id".to_string(), Value::String(self.id.to_string()));
        body.insert(
            "created_at".to_string(),
            serde_json::to_value(self.created_at)?,
        );
        Ok(serde_json::from_value(Value::Object(body))?)
    }
}

/// Equality filter over top-level body fields. An empty filter matches all.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    fields: Map<String, Value>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// Convenience for id-typed fields, which are stored as strings.
    pub fn eq_id(self, field: &str, id: Uuid) -> Self {
        self.eq(field, id.to_string())
    }

    pub fn matches(&self, body: &Value) -> bool {
        self.fields
            .iter()
            .all(|(k, v)| body.get(k).map(|b| b == v).unwrap_or(false))
    }

    /// JSON containment document used by the Postgres `@>` operator.
    pub fn as_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// The store trait. Implement this to swap backends without touching the
/// domain modules or handlers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: Collection, body: Value) -> Result<Document, AppError>;

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, AppError>;

    /// Shallow merge of `fields` into the stored body. `NotFound` if absent.
    async fn patch(
        &self,
        collection: Collection,
        id: Uuid,
        fields: Value,
    ) -> Result<Document, AppError>;

    /// Returns whether a document was removed.
    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, AppError>;

    /// Matching documents in insertion order.
    async fn list(&self, collection: Collection, filter: &Filter)
        -> Result<Vec<Document>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Typed helpers shared by the domain modules
// ────────────────────────────────────────────────────────────────────────────

/// Serializes `body`, inserts it, and decodes the stored record.
pub async fn insert_record<B: Serialize + Sync, T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    body: &B,
) -> Result<T, AppError> {
    let doc = store.insert(collection, serde_json::to_value(body)?).await?;
    doc.decode()
}

pub async fn get_record<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: Uuid,
) -> Result<Option<T>, AppError> {
    store.get(collection, id).await?.map(Document::decode).transpose()
}

/// Like `get_record`, but a missing document is `NotFound`.
pub async fn require_record<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: Uuid,
    what: &str,
) -> Result<T, AppError> {
    get_record(store, collection, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{what} {id} not found")))
}

pub async fn patch_record<P: Serialize + Sync, T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: Uuid,
    patch: &P,
) -> Result<T, AppError> {
    store
        .patch(collection, id, serde_json::to_value(patch)?)
        .await?
        .decode()
}

pub async fn list_records<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    filter: &Filter,
) -> Result<Vec<T>, AppError> {
    store
        .list(collection, filter)
        .await?
        .into_iter()
        .map(Document::decode)
        .collect()
}

/// Deletes every matching document, one independent call per document.
/// Returns how many were removed.
pub async fn delete_where(
    store: &dyn DocumentStore,
    collection: Collection,
    filter: &Filter,
) -> Result<usize, AppError> {
    let mut removed = 0;
    for doc in store.list(collection, filter).await? {
        if store.delete(collection, doc.id).await? {
            removed += 1;
        }
    }
    Ok(removed)
}
