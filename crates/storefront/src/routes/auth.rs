//! Authentication route handlers.
//!
//! Handles registration, login, logout, and the current-user lookup. Login
//! issues a bearer token; clients send it back in the `Authorization`
//! header.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use zada_core::SyncResult;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::CurrentUser;
use crate::models::PublicUser;
use crate::services::{AuthService, RegisterRequest};
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<SyncResult<PublicUser>>> {
    let auth = AuthService::new(state.gateway(), state.keys());
    let user = auth.register(request).await?;
    Ok(Json(SyncResult::ok(user)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SyncResult<LoginResponse>>> {
    let auth = AuthService::new(state.gateway(), state.keys());
    let user = auth.login(&request.email, &request.password).await?;

    set_sentry_user(&user.id, Some(user.email.as_str()));
    let token = state.sessions().issue(user.clone()).await;

    Ok(Json(SyncResult::ok(LoginResponse { token, user })))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<SyncResult<()>>> {
    let auth = AuthService::new(state.gateway(), state.keys());
    auth.logout(user.id).await?;

    state.sessions().revoke_user(user.id).await;
    clear_sentry_user();

    Ok(Json(SyncResult::ok(())))
}

/// GET /api/auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<SyncResult<PublicUser>> {
    Json(SyncResult::ok(user))
}
