use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{NewUser, Role, User, UserPatch};
use crate::store::{
    delete_where, insert_record, list_records, patch_record, require_record,
    Collection, DocumentStore, Filter,
};

/// Creates a user. Role defaults to student; onboarding starts incomplete.
pub async fn create_user(store: &dyn DocumentStore, new: &NewUser) -> Result<User, AppError> {
    if new.auth_user_id.trim().is_empty() {
        return Err(AppError::Validation("auth_user_id must not be empty".into()));
    }
    if find_by_auth_id(store, &new.auth_user_id).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "User with auth id {} already exists",
            new.auth_user_id
        )));
    }

    let user: User = insert_record(
        store,
        Collection::Users,
        &json!({
            "auth_user_id": new.auth_user_id,
            "email": new.email,
            "name": new.name,
            "role": new.role.unwrap_or_default(),
            "onboarding_completed": false,
            "verification_id_used": false,
        }),
    )
    .await?;

    info!("Created {} user {}", user.role.as_str(), user.id);
    Ok(user)
}

pub async fn require_user(store: &dyn DocumentStore, id: Uuid) -> Result<User, AppError> {
    require_record(store, Collection::Users, id, "User").await
}

pub async fn find_by_auth_id(
    store: &dyn DocumentStore,
    auth_user_id: &str,
) -> Result<Option<User>, AppError> {
    let users: Vec<User> = list_records(
        store,
        Collection::Users,
        &Filter::all().eq("auth_user_id", auth_user_id),
    )
    .await?;
    Ok(users.into_iter().next())
}

pub async fn find_by_email(store: &dyn DocumentStore, email: &str) -> Result<Option<User>, AppError> {
    let users: Vec<User> =
        list_records(store, Collection::Users, &Filter::all().eq("email", email)).await?;
    Ok(users.into_iter().next())
}

pub async fn list_by_role(store: &dyn DocumentStore, role: Role) -> Result<Vec<User>, AppError> {
    list_records(store, Collection::Users, &Filter::all().eq("role", role.as_str())).await
}

/// Returns the user for `auth_user_id`, creating a bare student record on
/// first sight.
pub async fn sync_profile(
    store: &dyn DocumentStore,
    auth_user_id: &str,
    email: Option<&str>,
) -> Result<User, AppError> {
    if let Some(user) = find_by_auth_id(store, auth_user_id).await? {
        return Ok(user);
    }
    info!("No user record for auth id {auth_user_id}; creating one");
    create_user(
        store,
        &NewUser {
            auth_user_id: auth_user_id.to_string(),
            email: email.unwrap_or_default().to_string(),
            name: None,
            role: Some(Role::Student),
        },
    )
    .await
}

pub async fn patch_user(
    store: &dyn DocumentStore,
    id: Uuid,
    patch: &UserPatch,
) -> Result<User, AppError> {
    patch_record(store, Collection::Users, id, patch).await
}

pub async fn update_role(store: &dyn DocumentStore, id: Uuid, role: Role) -> Result<User, AppError> {
    require_user(store, id).await?;
    let user = patch_user(
        store,
        id,
        &UserPatch {
            role: Some(role),
            ..Default::default()
        },
    )
    .await?;
    info!("User {id} role set to {}", role.as_str());
    Ok(user)
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct UserDeletion {
    pub user_id: Uuid,
    pub assessments: usize,
    pub enrollments: usize,
    pub progress_records: usize,
    pub onboarding_records: usize,
}

/// Deletes a user and everything hanging off it, in order: assessments,
/// enrollments, progress, onboarding records, then the user. Each delete is
/// its own call; a failure part-way leaves the earlier deletes applied.
pub async fn delete_user(store: &dyn DocumentStore, id: Uuid) -> Result<UserDeletion, AppError> {
    let user = require_user(store, id).await?;
    let by_user = Filter::all().eq_id("user_id", id);

    let deletion = UserDeletion {
        user_id: id,
        assessments: delete_where(store, Collection::Assessments, &by_user).await?,
        enrollments: delete_where(store, Collection::Enrollments, &by_user).await?,
        progress_records: delete_where(store, Collection::UserProgress, &by_user).await?,
        onboarding_records: delete_where(
            store,
            Collection::Onboardings,
            &Filter::all().eq("auth_user_id", user.auth_user_id.as_str()),
        )
        .await?,
    };

    if !store.delete(Collection::Users, id).await? {
        warn!("User {id} vanished before its record could be deleted");
    }
    info!(
        "Deleted user {id} ({} assessments, {} enrollments, {} progress records)",
        deletion.assessments, deletion.enrollments, deletion.progress_records
    );
    Ok(deletion)
}

/// Stamps onboarding as complete.
pub fn completed_patch() -> UserPatch {
    UserPatch {
        onboarding_completed: Some(true),
        onboarding_completed_at: Some(Utc::now()),
        ..Default::default()
    }
}
