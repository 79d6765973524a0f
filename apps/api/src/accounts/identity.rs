//! Caller identity. The upstream identity provider authenticates the request
//! and forwards its subject id in `x-auth-user-id`; this module only maps
//! that id to a user record.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::accounts::access::{permits, Action};
use crate::accounts::users::find_by_auth_id;
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;
use crate::store::DocumentStore;

pub const AUTH_USER_HEADER: &str = "x-auth-user-id";

pub fn auth_user_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTH_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Looks up the calling user, if the request carries an identity and the
/// identity has a user record.
pub async fn resolve_user(
    store: &dyn DocumentStore,
    headers: &HeaderMap,
) -> Result<Option<User>, AppError> {
    match auth_user_id(headers) {
        Some(id) => find_by_auth_id(store, id).await,
        None => Ok(None),
    }
}

/// The calling user. Rejects with 401 when there is no identity or no
/// user record for it.
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// `Forbidden` unless the caller's role permits `action`.
    pub fn require(&self, action: Action) -> Result<&User, AppError> {
        if permits(self.0.role, action) {
            Ok(&self.0)
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        resolve_user(state.store.as_ref(), &parts.headers)
            .await?
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// The calling user if known; never rejects on a missing identity.
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    /// False for anonymous callers.
    pub fn permits(&self, action: Action) -> bool {
        self.0.as_ref().is_some_and(|user| permits(user.role, action))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        Ok(MaybeUser(
            resolve_user(state.store.as_ref(), &parts.headers).await?,
        ))
    }
}
