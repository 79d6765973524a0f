//! Axum route handlers for enrollments and chapter progress.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::accounts::access::{permits, Action};
use crate::accounts::identity::CurrentUser;
use crate::errors::AppError;
use crate::learning::{enrollments, progress};
use crate::models::enrollment::{Enrollment, EnrollmentWithCourse};
use crate::models::progress::{CourseProgress, ProgressRecord};
use crate::state::AppState;

/// POST /api/v1/courses/:id/enroll
///
/// 201 on a new enrollment, 200 when the caller was already enrolled.
pub async fn handle_enroll(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(course_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let user = caller.require(Action::Enroll)?;
    let (enrollment, created) =
        enrollments::enroll(state.store.as_ref(), user.id, course_id).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(enrollment)))
}

/// GET /api/v1/enrollments/mine
pub async fn handle_my_enrollments(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<EnrollmentWithCourse>>, AppError> {
    Ok(Json(
        enrollments::list_by_user(state.store.as_ref(), user.id).await?,
    ))
}

/// GET /api/v1/courses/:id/enrollments
pub async fn handle_course_enrollments(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Enrollment>>, AppError> {
    caller.require(Action::ManageCatalog)?;
    Ok(Json(
        enrollments::list_by_course(state.store.as_ref(), course_id).await?,
    ))
}

/// DELETE /api/v1/enrollments/:id
///
/// The enrolled user may withdraw; admins may remove anyone.
pub async fn handle_delete_enrollment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let store = state.store.as_ref();
    let enrollment = enrollments::require_enrollment(store, id).await?;
    if enrollment.user_id != user.id && !permits(user.role, Action::ManageUsers) {
        return Err(AppError::Forbidden);
    }
    enrollments::delete_enrollment(store, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/chapters/:id/complete
pub async fn handle_complete_chapter(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(chapter_id): Path<Uuid>,
) -> Result<Json<ProgressRecord>, AppError> {
    let user = caller.require(Action::RecordProgress)?;
    Ok(Json(
        progress::record_completion(state.store.as_ref(), user.id, chapter_id).await?,
    ))
}

/// GET /api/v1/courses/:id/progress
pub async fn handle_course_progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseProgress>, AppError> {
    Ok(Json(
        progress::course_progress(state.store.as_ref(), user.id, course_id).await?,
    ))
}

/// GET /api/v1/progress/mine
pub async fn handle_my_progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ProgressRecord>>, AppError> {
    Ok(Json(progress::list_by_user(state.store.as_ref(), user.id).await?))
}

/// GET /api/v1/chapters/:id/progress
pub async fn handle_chapter_progress(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(chapter_id): Path<Uuid>,
) -> Result<Json<Vec<ProgressRecord>>, AppError> {
    caller.require(Action::ManageCatalog)?;
    Ok(Json(
        progress::list_by_chapter(state.store.as_ref(), chapter_id).await?,
    ))
}
