//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring bearer-token authentication in route
//! handlers. Tokens are issued at login and looked up in the in-memory
//! session store.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use zada_core::UserRole;

use crate::error::AppError;
use crate::models::PublicUser;
use crate::state::AppState;

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     CurrentUser(user): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct CurrentUser(pub PublicUser);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        let user = state
            .sessions()
            .get(token)
            .await
            .ok_or_else(|| AppError::Unauthorized("invalid or expired session".to_string()))?;

        Ok(Self(user))
    }
}

/// Extractor that requires a logged-in admin.
pub struct RequireAdmin(pub PublicUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != UserRole::Admin {
            return Err(AppError::Forbidden("admin access required".to_string()));
        }
        Ok(Self(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
