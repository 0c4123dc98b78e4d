//! Notification route handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use zada_core::{NotificationId, SyncResult};

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::Notification;
use crate::services::NotificationService;
use crate::state::AppState;

/// GET /api/notifications
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<SyncResult<Vec<Notification>>>> {
    let notifications = NotificationService::new(state.gateway(), state.keys(), state.events());
    Ok(Json(notifications.list(user.id).await?))
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<SyncResult<()>>> {
    let notifications = NotificationService::new(state.gateway(), state.keys(), state.events());
    notifications
        .mark_read(user.id, NotificationId::new(id))
        .await?;
    Ok(Json(SyncResult::ok(())))
}
