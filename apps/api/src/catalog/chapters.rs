use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::catalog::courses::require_course;
use crate::errors::AppError;
use crate::models::chapter::{Chapter, ChapterPatch, NewChapter};
use crate::store::{
    delete_where, insert_record, list_records, patch_record, require_record,
    Collection, DocumentStore, Filter,
};

pub async fn create_chapter(store: &dyn DocumentStore, new: &NewChapter) -> Result<Chapter, AppError> {
    let title = new.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title must not be empty".into()));
    }
    require_course(store, new.course_id).await?;

    insert_record(
        store,
        Collection::Chapters,
        &json!({
            "course_id": new.course_id,
            "title": title,
            "description": new.description,
            "video_url": new.video_url,
            "position": new.position,
            "is_published": false,
            "is_free": false,
        }),
    )
    .await
}

pub async fn require_chapter(store: &dyn DocumentStore, id: Uuid) -> Result<Chapter, AppError> {
    require_record(store, Collection::Chapters, id, "Chapter").await
}

/// Chapters of a course, ordered by position.
pub async fn list_by_course(store: &dyn DocumentStore, course_id: Uuid) -> Result<Vec<Chapter>, AppError> {
    list_sorted(store, Filter::all().eq_id("course_id", course_id)).await
}

pub async fn list_published_by_course(
    store: &dyn DocumentStore,
    course_id: Uuid,
) -> Result<Vec<Chapter>, AppError> {
    list_sorted(
        store,
        Filter::all()
            .eq_id("course_id", course_id)
            .eq("is_published", true),
    )
    .await
}

async fn list_sorted(store: &dyn DocumentStore, filter: Filter) -> Result<Vec<Chapter>, AppError> {
    let mut chapters: Vec<Chapter> = list_records(store, Collection::Chapters, &filter).await?;
    chapters.sort_by_key(|c| c.position);
    Ok(chapters)
}

pub async fn update_chapter(
    store: &dyn DocumentStore,
    id: Uuid,
    patch: &ChapterPatch,
) -> Result<Chapter, AppError> {
    if patch.title.as_deref().map(|t| t.trim().is_empty()).unwrap_or(false) {
        return Err(AppError::Validation("title must not be empty".into()));
    }
    require_chapter(store, id).await?;
    patch_record(store, Collection::Chapters, id, patch).await
}

pub async fn publish_chapter(store: &dyn DocumentStore, id: Uuid) -> Result<Chapter, AppError> {
    update_chapter(
        store,
        id,
        &ChapterPatch {
            is_published: Some(true),
            ..Default::default()
        },
    )
    .await
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct ChapterDeletion {
    pub chapter_id: Uuid,
    pub progress_records: usize,
}

/// Deletes a chapter after its progress records.
pub async fn delete_chapter(store: &dyn DocumentStore, id: Uuid) -> Result<ChapterDeletion, AppError> {
    require_chapter(store, id).await?;
    let progress_records = delete_where(
        store,
        Collection::UserProgress,
        &Filter::all().eq_id("chapter_id", id),
    )
    .await?;
    store.delete(Collection::Chapters, id).await?;

    info!("Deleted chapter {id} ({progress_records} progress records)");
    Ok(ChapterDeletion {
        chapter_id: id,
        progress_records,
    })
}
