//! Course categories and student categories. Names are unique within
//! each collection, compared case-insensitively.

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::category::{Category, StudentCategory};
use crate::store::{
    get_record, insert_record, list_records, patch_record, require_record, Collection,
    DocumentStore, Filter,
};

fn clean_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    Ok(name)
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

// ── Course categories ──────────────────────────────────────────────────────

pub async fn create_category(store: &dyn DocumentStore, name: &str) -> Result<Category, AppError> {
    let name = clean_name(name)?;
    if find_category_by_name(store, name).await?.is_some() {
        return Err(AppError::Conflict(format!("Category '{name}' already exists")));
    }
    insert_record(store, Collection::Categories, &json!({ "name": name })).await
}

/// All categories, sorted by name.
pub async fn list_categories(store: &dyn DocumentStore) -> Result<Vec<Category>, AppError> {
    let mut categories: Vec<Category> =
        list_records(store, Collection::Categories, &Filter::all()).await?;
    categories.sort_by_key(|c| c.name.to_lowercase());
    Ok(categories)
}

pub async fn get_category(store: &dyn DocumentStore, id: Uuid) -> Result<Option<Category>, AppError> {
    get_record(store, Collection::Categories, id).await
}

pub async fn find_category_by_name(
    store: &dyn DocumentStore,
    name: &str,
) -> Result<Option<Category>, AppError> {
    Ok(list_categories(store)
        .await?
        .into_iter()
        .find(|c| same_name(&c.name, name)))
}

pub async fn rename_category(
    store: &dyn DocumentStore,
    id: Uuid,
    name: &str,
) -> Result<Category, AppError> {
    let name = clean_name(name)?;
    let _: Category = require_record(store, Collection::Categories, id, "Category").await?;
    if let Some(other) = find_category_by_name(store, name).await? {
        if other.id != id {
            return Err(AppError::Conflict(format!("Category '{name}' already exists")));
        }
    }
    patch_record(store, Collection::Categories, id, &json!({ "name": name })).await
}

/// Courses keep their `category_id`; it simply stops resolving.
pub async fn delete_category(store: &dyn DocumentStore, id: Uuid) -> Result<(), AppError> {
    if !store.delete(Collection::Categories, id).await? {
        return Err(AppError::NotFound(format!("Category {id} not found")));
    }
    Ok(())
}

// ── Student categories ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct NewStudentCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentCategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub async fn create_student_category(
    store: &dyn DocumentStore,
    new: &NewStudentCategory,
) -> Result<StudentCategory, AppError> {
    let name = clean_name(&new.name)?;
    if find_student_category_by_name(store, name).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Student category '{name}' already exists"
        )));
    }
    insert_record(
        store,
        Collection::StudentCategories,
        &json!({ "name": name, "description": new.description }),
    )
    .await
}

pub async fn list_student_categories(
    store: &dyn DocumentStore,
) -> Result<Vec<StudentCategory>, AppError> {
    let mut categories: Vec<StudentCategory> =
        list_records(store, Collection::StudentCategories, &Filter::all()).await?;
    categories.sort_by_key(|c| c.name.to_lowercase());
    Ok(categories)
}

pub async fn get_student_category(
    store: &dyn DocumentStore,
    id: Uuid,
) -> Result<Option<StudentCategory>, AppError> {
    get_record(store, Collection::StudentCategories, id).await
}

pub async fn find_student_category_by_name(
    store: &dyn DocumentStore,
    name: &str,
) -> Result<Option<StudentCategory>, AppError> {
    Ok(list_student_categories(store)
        .await?
        .into_iter()
        .find(|c| same_name(&c.name, name)))
}

pub async fn update_student_category(
    store: &dyn DocumentStore,
    id: Uuid,
    patch: &StudentCategoryPatch,
) -> Result<StudentCategory, AppError> {
    let _: StudentCategory =
        require_record(store, Collection::StudentCategories, id, "Student category").await?;
    let mut patch = patch.clone();
    if let Some(name) = patch.name.as_deref() {
        let name = clean_name(name)?.to_string();
        if let Some(other) = find_student_category_by_name(store, &name).await? {
            if other.id != id {
                return Err(AppError::Conflict(format!(
                    "Student category '{name}' already exists"
                )));
            }
        }
        patch.name = Some(name);
    }
    patch_record(store, Collection::StudentCategories, id, &patch).await
}

pub async fn delete_student_category(store: &dyn DocumentStore, id: Uuid) -> Result<(), AppError> {
    if !store.delete(Collection::StudentCategories, id).await? {
        return Err(AppError::NotFound(format!("Student category {id} not found")));
    }
    Ok(())
}
