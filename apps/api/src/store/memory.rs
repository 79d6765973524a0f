use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{Collection, Document, DocumentStore, Filter};
use crate::errors::AppError;

/// Process-local document store. Used by tests and when no database is
/// configured; contents are lost on restart.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: Collection, body: Value) -> Result<Document, AppError> {
        if !body.is_object() {
            return Err(AppError::Validation(format!(
                "{} documents must be JSON objects",
                collection.as_str()
            )));
        }
        let doc = Document {
            id: Uuid::new_v4(),
            collection: collection.as_str().to_string(),
            body,
            created_at: Utc::now(),
        };
        debug!("insert {} {}", collection.as_str(), doc.id);
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, AppError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn patch(
        &self,
        collection: Collection,
        id: Uuid,
        fields: Value,
    ) -> Result<Document, AppError> {
        let Value::Object(fields) = fields else {
            return Err(AppError::Validation("patch must be a JSON object".into()));
        };
        let mut guard = self.collections.write().await;
        let doc = guard
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| {
                AppError::NotFound(format!("{} document {id} not found", collection.as_str()))
            })?;
        if let Value::Object(body) = &mut doc.body {
            for (k, v) in fields {
                body.insert(k, v);
            }
        }
        debug!("patch {} {}", collection.as_str(), id);
        Ok(doc.clone())
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, AppError> {
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(&collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| d.id != id);
        let removed = docs.len() < before;
        debug!("delete {} {} (removed: {removed})", collection.as_str(), id);
        Ok(removed)
    }

    async fn list(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, AppError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filter.matches(&d.body))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
