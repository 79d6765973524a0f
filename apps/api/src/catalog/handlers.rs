//! Axum route handlers for courses, chapters, attachments and categories.
//!
//! Reads of published content are open; everything that changes the
//! catalog needs `Action::ManageCatalog`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::accounts::access::Action;
use crate::accounts::identity::{CurrentUser, MaybeUser};
use crate::catalog::{attachments, categories, chapters, courses};
use crate::catalog::categories::{NewStudentCategory, StudentCategoryPatch};
use crate::catalog::chapters::ChapterDeletion;
use crate::catalog::courses::{CourseDeletion, CourseQuery};
use crate::errors::AppError;
use crate::models::attachment::{Attachment, NewAttachment};
use crate::models::category::{Category, StudentCategory};
use crate::models::chapter::{Chapter, ChapterPatch, NewChapter};
use crate::models::course::{Course, CoursePatch, NewCourse};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChapterRequest {
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    /// Appended after the last chapter when omitted.
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct AttachmentRequest {
    pub url: String,
    #[serde(default)]
    pub original_filename: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Courses
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/courses
pub async fn handle_list_published(
    State(state): State<AppState>,
) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(courses::list_published(state.store.as_ref()).await?))
}

/// GET /api/v1/courses/manage?title=&category_id=
///
/// Every course, drafts included.
pub async fn handle_list_all_courses(
    State(state): State<AppState>,
    caller: CurrentUser,
    Query(query): Query<CourseQuery>,
) -> Result<Json<Vec<Course>>, AppError> {
    caller.require(Action::ManageCatalog)?;
    Ok(Json(courses::list_courses(state.store.as_ref(), &query).await?))
}

/// GET /api/v1/courses/mine
///
/// Published courses targeted at the caller's student type.
pub async fn handle_list_for_student(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(
        courses::list_for_student(state.store.as_ref(), user.student_type.as_deref()).await?,
    ))
}

/// POST /api/v1/courses
pub async fn handle_create_course(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(request): Json<NewCourse>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    caller.require(Action::ManageCatalog)?;
    let course = courses::create_course(state.store.as_ref(), &request).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// GET /api/v1/courses/:id
///
/// Drafts read as missing unless the caller manages the catalog.
pub async fn handle_get_course(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>, AppError> {
    let course = courses::require_course(state.store.as_ref(), id).await?;
    if !course.is_published && !caller.permits(Action::ManageCatalog) {
        return Err(AppError::NotFound(format!("Course {id} not found")));
    }
    Ok(Json(course))
}

/// PATCH /api/v1/courses/:id
pub async fn handle_update_course(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<CoursePatch>,
) -> Result<Json<Course>, AppError> {
    caller.require(Action::ManageCatalog)?;
    Ok(Json(courses::update_course(state.store.as_ref(), id, &patch).await?))
}

/// POST /api/v1/courses/:id/publish
pub async fn handle_publish_course(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>, AppError> {
    caller.require(Action::ManageCatalog)?;
    Ok(Json(courses::set_published(state.store.as_ref(), id, true).await?))
}

/// POST /api/v1/courses/:id/unpublish
pub async fn handle_unpublish_course(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>, AppError> {
    caller.require(Action::ManageCatalog)?;
    Ok(Json(courses::set_published(state.store.as_ref(), id, false).await?))
}

/// DELETE /api/v1/courses/:id
pub async fn handle_delete_course(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseDeletion>, AppError> {
    caller.require(Action::ManageCatalog)?;
    Ok(Json(courses::delete_course(state.store.as_ref(), id).await?))
}

// ────────────────────────────────────────────────────────────────────────────
// Chapters
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/courses/:id/chapters
pub async fn handle_list_published_chapters(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Chapter>>, AppError> {
    Ok(Json(
        chapters::list_published_by_course(state.store.as_ref(), course_id).await?,
    ))
}

/// GET /api/v1/courses/:id/chapters/all
pub async fn handle_list_all_chapters(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Chapter>>, AppError> {
    caller.require(Action::ManageCatalog)?;
    Ok(Json(chapters::list_by_course(state.store.as_ref(), course_id).await?))
}

/// POST /api/v1/courses/:id/chapters
pub async fn handle_create_chapter(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(course_id): Path<Uuid>,
    Json(request): Json<ChapterRequest>,
) -> Result<(StatusCode, Json<Chapter>), AppError> {
    caller.require(Action::ManageCatalog)?;
    let store = state.store.as_ref();

    let position = match request.position {
        Some(p) => p,
        None => chapters::list_by_course(store, course_id)
            .await?
            .last()
            .map(|c| c.position + 1)
            .unwrap_or(1),
    };
    let chapter = chapters::create_chapter(
        store,
        &NewChapter {
            course_id,
            title: request.title,
            description: request.description,
            video_url: request.video_url,
            position,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(chapter)))
}

/// GET /api/v1/chapters/:id
pub async fn handle_get_chapter(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Chapter>, AppError> {
    let chapter = chapters::require_chapter(state.store.as_ref(), id).await?;
    if !chapter.is_published && !caller.permits(Action::ManageCatalog) {
        return Err(AppError::NotFound(format!("Chapter {id} not found")));
    }
    Ok(Json(chapter))
}

/// PATCH /api/v1/chapters/:id
pub async fn handle_update_chapter(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<ChapterPatch>,
) -> Result<Json<Chapter>, AppError> {
    caller.require(Action::ManageCatalog)?;
    Ok(Json(chapters::update_chapter(state.store.as_ref(), id, &patch).await?))
}

/// POST /api/v1/chapters/:id/publish
pub async fn handle_publish_chapter(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Chapter>, AppError> {
    caller.require(Action::ManageCatalog)?;
    Ok(Json(chapters::publish_chapter(state.store.as_ref(), id).await?))
}

/// DELETE /api/v1/chapters/:id
pub async fn handle_delete_chapter(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ChapterDeletion>, AppError> {
    caller.require(Action::ManageCatalog)?;
    Ok(Json(chapters::delete_chapter(state.store.as_ref(), id).await?))
}

// ────────────────────────────────────────────────────────────────────────────
// Attachments
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/courses/:id/attachments
pub async fn handle_list_attachments(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Attachment>>, AppError> {
    Ok(Json(
        attachments::list_by_course(state.store.as_ref(), course_id).await?,
    ))
}

/// POST /api/v1/courses/:id/attachments
pub async fn handle_create_attachment(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(course_id): Path<Uuid>,
    Json(request): Json<AttachmentRequest>,
) -> Result<(StatusCode, Json<Attachment>), AppError> {
    caller.require(Action::ManageCatalog)?;
    let attachment = attachments::create_attachment(
        state.store.as_ref(),
        &NewAttachment {
            course_id,
            url: request.url,
            original_filename: request.original_filename,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(attachment)))
}

/// DELETE /api/v1/attachments/:id
pub async fn handle_delete_attachment(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    caller.require(Action::ManageCatalog)?;
    attachments::delete_attachment(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Categories
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/categories
pub async fn handle_list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(categories::list_categories(state.store.as_ref()).await?))
}

/// POST /api/v1/categories
pub async fn handle_create_category(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(request): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    caller.require(Action::ManageCatalog)?;
    let category = categories::create_category(state.store.as_ref(), &request.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/v1/categories/:id
pub async fn handle_get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, AppError> {
    categories::get_category(state.store.as_ref(), id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Category {id} not found")))
}

/// GET /api/v1/categories/by-name/:name
pub async fn handle_get_category_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Category>, AppError> {
    categories::find_category_by_name(state.store.as_ref(), &name)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Category '{name}' not found")))
}

/// PATCH /api/v1/categories/:id
pub async fn handle_rename_category(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<Category>, AppError> {
    caller.require(Action::ManageCatalog)?;
    Ok(Json(
        categories::rename_category(state.store.as_ref(), id, &request.name).await?,
    ))
}

/// DELETE /api/v1/categories/:id
pub async fn handle_delete_category(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    caller.require(Action::ManageCatalog)?;
    categories::delete_category(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/student-categories
pub async fn handle_list_student_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentCategory>>, AppError> {
    Ok(Json(
        categories::list_student_categories(state.store.as_ref()).await?,
    ))
}

/// POST /api/v1/student-categories
pub async fn handle_create_student_category(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(request): Json<NewStudentCategory>,
) -> Result<(StatusCode, Json<StudentCategory>), AppError> {
    caller.require(Action::ManageCatalog)?;
    let category = categories::create_student_category(state.store.as_ref(), &request).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/v1/student-categories/:id
pub async fn handle_get_student_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StudentCategory>, AppError> {
    categories::get_student_category(state.store.as_ref(), id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Student category {id} not found")))
}

/// GET /api/v1/student-categories/by-name/:name
pub async fn handle_get_student_category_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<StudentCategory>, AppError> {
    categories::find_student_category_by_name(state.store.as_ref(), &name)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Student category '{name}' not found")))
}

/// PATCH /api/v1/student-categories/:id
pub async fn handle_update_student_category(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<StudentCategoryPatch>,
) -> Result<Json<StudentCategory>, AppError> {
    caller.require(Action::ManageCatalog)?;
    Ok(Json(
        categories::update_student_category(state.store.as_ref(), id, &patch).await?,
    ))
}

/// DELETE /api/v1/student-categories/:id
pub async fn handle_delete_student_category(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    caller.require(Action::ManageCatalog)?;
    categories::delete_student_category(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
