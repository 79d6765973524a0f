use serde_json::json;
use uuid::Uuid;

use crate::catalog::courses::require_course;
use crate::errors::AppError;
use crate::models::attachment::{Attachment, NewAttachment};
use crate::store::{insert_record, list_records, Collection, DocumentStore, Filter};

/// Records an already-uploaded file against a course. Upload itself happens elsewhere.
pub async fn create_attachment(
    store: &dyn DocumentStore,
    new: &NewAttachment,
) -> Result<Attachment, AppError> {
    if new.url.trim().is_empty() {
        return Err(AppError::Validation("url must not be empty".into()));
    }
    require_course(store, new.course_id).await?;

    let original_filename = match new.original_filename.trim() {
        "" => new.url.rsplit('/').next().unwrap_or_default().to_string(),
        name => name.to_string(),
    };
    insert_record(
        store,
        Collection::Attachments,
        &json!({
            "course_id": new.course_id,
            "url": new.url.trim(),
            "original_filename": original_filename,
        }),
    )
    .await
}

pub async fn list_by_course(
    store: &dyn DocumentStore,
    course_id: Uuid,
) -> Result<Vec<Attachment>, AppError> {
    list_records(
        store,
        Collection::Attachments,
        &Filter::all().eq_id("course_id", course_id),
    )
    .await
}

pub async fn delete_attachment(store: &dyn DocumentStore, id: Uuid) -> Result<(), AppError> {
    if !store.delete(Collection::Attachments, id).await? {
        return Err(AppError::NotFound(format!("Attachment {id} not found")));
    }
    Ok(())
}
