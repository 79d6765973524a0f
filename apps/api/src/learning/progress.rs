use std::collections::HashSet;

use chrono::Utc;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::catalog::chapters::{list_published_by_course, require_chapter};
use crate::errors::AppError;
use crate::models::progress::{CourseProgress, ProgressRecord};
use crate::store::{insert_record, list_records, patch_record, Collection, DocumentStore, Filter};

async fn find_progress(
    store: &dyn DocumentStore,
    user_id: Uuid,
    chapter_id: Uuid,
) -> Result<Option<ProgressRecord>, AppError> {
    let records: Vec<ProgressRecord> = list_records(
        store,
        Collection::UserProgress,
        &Filter::all()
            .eq_id("user_id", user_id)
            .eq_id("chapter_id", chapter_id),
    )
    .await?;
    Ok(records.into_iter().next())
}

/// Marks a chapter completed for a user. Completing twice keeps the first
/// completion time.
pub async fn record_completion(
    store: &dyn DocumentStore,
    user_id: Uuid,
    chapter_id: Uuid,
) -> Result<ProgressRecord, AppError> {
    require_chapter(store, chapter_id).await?;

    match find_progress(store, user_id, chapter_id).await? {
        Some(existing) if existing.is_completed => Ok(existing),
        Some(existing) => {
            patch_record(
                store,
                Collection::UserProgress,
                existing.id,
                &json!({ "is_completed": true, "completed_at": Utc::now() }),
            )
            .await
        }
        None => {
            debug!("User {user_id} completed chapter {chapter_id}");
            insert_record(
                store,
                Collection::UserProgress,
                &json!({
                    "user_id": user_id,
                    "chapter_id": chapter_id,
                    "is_completed": true,
                    "completed_at": Utc::now(),
                }),
            )
            .await
        }
    }
}

/// Completion over the course's published chapters.
pub async fn course_progress(
    store: &dyn DocumentStore,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<CourseProgress, AppError> {
    let chapter_ids: HashSet<Uuid> = list_published_by_course(store, course_id)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();

    let completed_chapters = list_by_user(store, user_id)
        .await?
        .iter()
        .filter(|p| p.is_completed && chapter_ids.contains(&p.chapter_id))
        .map(|p| p.chapter_id)
        .collect::<HashSet<_>>()
        .len();

    Ok(summarize(chapter_ids.len(), completed_chapters))
}

fn summarize(total_chapters: usize, completed_chapters: usize) -> CourseProgress {
    let progress_percentage = if total_chapters == 0 {
        0
    } else {
        ((completed_chapters as f64 / total_chapters as f64) * 100.0).round() as u32
    };
    CourseProgress {
        total_chapters,
        completed_chapters,
        progress_percentage,
    }
}

pub async fn list_by_user(
    store: &dyn DocumentStore,
    user_id: Uuid,
) -> Result<Vec<ProgressRecord>, AppError> {
    list_records(
        store,
        Collection::UserProgress,
        &Filter::all().eq_id("user_id", user_id),
    )
    .await
}

pub async fn list_by_chapter(
    store: &dyn DocumentStore,
    chapter_id: Uuid,
) -> Result<Vec<ProgressRecord>, AppError> {
    list_records(
        store,
        Collection::UserProgress,
        &Filter::all().eq_id("chapter_id", chapter_id),
    )
    .await
}
