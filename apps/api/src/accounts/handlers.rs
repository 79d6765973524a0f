//! Axum route handlers for users, verification, onboarding and access checks.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::accounts::access::{authorize, permits, Action, Area, Decision};
use crate::accounts::identity::{auth_user_id, CurrentUser, MaybeUser};
use crate::accounts::onboarding::{
    find_onboarding_record, onboarding_status, submit_instructor_details, submit_profile,
    submit_student_details, InstructorDetailsSubmission, OnboardingStatus, ProfileSubmission,
    StudentDetailsSubmission,
};
use crate::accounts::users::{
    delete_user, find_by_email, list_by_role, patch_user, require_user, sync_profile,
    update_role, UserDeletion,
};
use crate::accounts::verification::{issue_verification_id, redeem_verification_id, IssuedVerification};
use crate::errors::AppError;
use crate::models::onboarding::OnboardingRecord;
use crate::models::user::{Role, SafeProfile, SkillLevel, User, UserPatch};
use crate::notify::templates::verification_email;
use crate::notify::DeliveryReceipt;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SyncRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Role,
}

/// Fields a user may change on their own record.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub career_interest: Option<String>,
    pub current_level: Option<SkillLevel>,
    pub learning_goals: Option<String>,
    pub specialization: Option<String>,
    pub bio: Option<String>,
    pub qualifications: Option<String>,
    pub years_of_experience: Option<u32>,
}

impl From<ProfileUpdate> for UserPatch {
    fn from(update: ProfileUpdate) -> Self {
        UserPatch {
            name: update.name,
            career_interest: update.career_interest,
            current_level: update.current_level,
            learning_goals: update.learning_goals,
            specialization: update.specialization,
            bio: update.bio,
            qualifications: update.qualifications,
            years_of_experience: update.years_of_experience,
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerificationIssuedResponse {
    #[serde(flatten)]
    pub issued: IssuedVerification,
    pub delivery: DeliveryReceipt,
}

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub verification_id: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Users
// ────────────────────────────────────────────────────────────────────────────

/// Hides the verification id from anyone who cannot manage users.
fn visible_to(viewer: Role, user: User) -> User {
    if permits(viewer, Action::ManageUsers) {
        user
    } else {
        user.without_verification_id()
    }
}

/// POST /api/v1/users/sync
///
/// Get-or-create the caller's user record. Needs the identity header but
/// not an existing record.
pub async fn handle_sync_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SyncRequest>,
) -> Result<Json<User>, AppError> {
    let auth_id = auth_user_id(&headers).ok_or(AppError::Unauthorized)?;
    let user = sync_profile(state.store.as_ref(), auth_id, request.email.as_deref()).await?;
    Ok(Json(visible_to(user.role, user)))
}

/// GET /api/v1/users/me
pub async fn handle_me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(visible_to(user.role, user))
}

/// GET /api/v1/users/me/profile
pub async fn handle_safe_profile(CurrentUser(user): CurrentUser) -> Json<SafeProfile> {
    Json(user.safe_profile())
}

/// PATCH /api/v1/users/me
pub async fn handle_update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, AppError> {
    if update.name.as_deref().map(|n| n.trim().is_empty()).unwrap_or(false) {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    let patch = UserPatch::from(update);
    let updated = patch_user(state.store.as_ref(), user.id, &patch).await?;
    Ok(Json(visible_to(user.role, updated)))
}

/// GET /api/v1/users?role=student
pub async fn handle_list_users(
    State(state): State<AppState>,
    caller: CurrentUser,
    Query(query): Query<RoleQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    caller.require(Action::ManageUsers)?;
    Ok(Json(list_by_role(state.store.as_ref(), query.role).await?))
}

/// GET /api/v1/users/by-email/:email
pub async fn handle_get_by_email(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(email): Path<String>,
) -> Result<Json<User>, AppError> {
    caller.require(Action::ManageUsers)?;
    find_by_email(state.store.as_ref(), &email)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No user with email {email}")))
}

/// GET /api/v1/users/:id
///
/// Users may read their own record; admins may read any.
pub async fn handle_get_user(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    if caller.id != id && !permits(caller.role, Action::ManageUsers) {
        return Err(AppError::Forbidden);
    }
    let user = require_user(state.store.as_ref(), id).await?;
    Ok(Json(visible_to(caller.role, user)))
}

/// PUT /api/v1/users/:id/role
pub async fn handle_update_role(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RoleRequest>,
) -> Result<Json<User>, AppError> {
    caller.require(Action::ManageUsers)?;
    Ok(Json(update_role(state.store.as_ref(), id, request.role).await?))
}

/// DELETE /api/v1/users/:id
pub async fn handle_delete_user(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDeletion>, AppError> {
    let admin = caller.require(Action::ManageUsers)?;
    if admin.id == id {
        return Err(AppError::Validation("admins cannot delete themselves".into()));
    }
    Ok(Json(delete_user(state.store.as_ref(), id).await?))
}

// ────────────────────────────────────────────────────────────────────────────
// Verification
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/users/:id/verification
///
/// Issues a verification id and emails it to the student. The id is stored
/// before the email is attempted; a delivery failure returns 502 and the
/// id stays issued.
pub async fn handle_issue_verification(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<VerificationIssuedResponse>, AppError> {
    caller.require(Action::IssueVerification)?;
    let store = state.store.as_ref();

    let issued = issue_verification_id(store, id, Utc::now()).await?;
    let email = verification_email(
        &issued.email,
        issued.name.as_deref().unwrap_or("Student"),
        &issued.verification_id,
    );
    let delivery = state.mailer.send(&email).await?;
    info!("Verification id for {id} sent to {}", issued.email);

    Ok(Json(VerificationIssuedResponse { issued, delivery }))
}

/// POST /api/v1/verification/redeem
pub async fn handle_redeem_verification(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<RedeemRequest>,
) -> Result<Json<SafeProfile>, AppError> {
    let user =
        redeem_verification_id(state.store.as_ref(), &user, &request.verification_id).await?;
    Ok(Json(user.safe_profile()))
}

// ────────────────────────────────────────────────────────────────────────────
// Onboarding
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/onboarding
pub async fn handle_onboarding_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<OnboardingStatus>, AppError> {
    Ok(Json(onboarding_status(state.store.as_ref(), &user).await?))
}

/// POST /api/v1/onboarding/profile
pub async fn handle_onboarding_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(submission): Json<ProfileSubmission>,
) -> Result<Json<OnboardingStatus>, AppError> {
    Ok(Json(
        submit_profile(state.store.as_ref(), &user, &submission).await?,
    ))
}

/// POST /api/v1/onboarding/student
pub async fn handle_onboarding_student(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(submission): Json<StudentDetailsSubmission>,
) -> Result<Json<OnboardingStatus>, AppError> {
    Ok(Json(
        submit_student_details(state.store.as_ref(), &user, &submission).await?,
    ))
}

/// POST /api/v1/onboarding/instructor
pub async fn handle_onboarding_instructor(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(submission): Json<InstructorDetailsSubmission>,
) -> Result<Json<OnboardingStatus>, AppError> {
    Ok(Json(
        submit_instructor_details(state.store.as_ref(), &user, &submission).await?,
    ))
}

/// GET /api/v1/onboarding/record
pub async fn handle_onboarding_record(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<OnboardingRecord>, AppError> {
    find_onboarding_record(state.store.as_ref(), &user.auth_user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No onboarding record".to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Access
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/access/:area
///
/// The route-guard decision for the caller. Always 200; the decision
/// itself says whether to redirect.
pub async fn handle_access(
    MaybeUser(user): MaybeUser,
    Path(area): Path<Area>,
) -> Json<Decision> {
    let profile = user.as_ref().map(User::safe_profile);
    Json(authorize(profile.as_ref(), area))
}
