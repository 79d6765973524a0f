//! Axum route handlers for the career-path assessment.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::access::Action;
use crate::accounts::identity::CurrentUser;
use crate::assessment::questions::{path_views, question_views, PathView, QuestionView};
use crate::assessment::scoring::AnswerSet;
use crate::assessment::submission::{
    all_for_user, delete_latest_for_user, latest_for_user, submit_assessment, SubmissionOutcome,
    SubmissionStatus,
};
use crate::errors::AppError;
use crate::models::assessment::AssessmentRecord;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CatalogueResponse {
    pub questions: Vec<QuestionView>,
    pub paths: Vec<PathView>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Question id to option index or option text.
    pub answers: AnswerSet,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: Uuid,
}

/// GET /api/v1/assessment
///
/// The question bank without weights, plus the path table.
pub async fn handle_catalogue() -> Json<CatalogueResponse> {
    Json(CatalogueResponse {
        questions: question_views(),
        paths: path_views(),
    })
}

/// POST /api/v1/assessment
///
/// 201 on a first submission, 200 on a retake.
pub async fn handle_submit(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(request): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmissionOutcome>), AppError> {
    let user = caller.require(Action::TakeAssessment)?;
    let outcome = submit_assessment(
        state.store.as_ref(),
        &user.auth_user_id,
        &request.answers,
        state.config.unmatched_option,
        Utc::now(),
    )
    .await?;

    let status = match outcome.status {
        SubmissionStatus::Created => StatusCode::CREATED,
        SubmissionStatus::Updated => StatusCode::OK,
    };
    Ok((status, Json(outcome)))
}

/// GET /api/v1/assessment/latest
pub async fn handle_latest(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<AssessmentRecord>, AppError> {
    latest_for_user(state.store.as_ref(), user.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No assessment taken yet".to_string()))
}

/// GET /api/v1/assessment/history
pub async fn handle_history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<AssessmentRecord>>, AppError> {
    Ok(Json(all_for_user(state.store.as_ref(), user.id).await?))
}

/// DELETE /api/v1/assessment/latest
pub async fn handle_delete_latest(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DeletedResponse>, AppError> {
    let deleted = delete_latest_for_user(state.store.as_ref(), user.id).await?;
    Ok(Json(DeletedResponse { deleted }))
}
