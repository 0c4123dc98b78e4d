//! Order route handlers.

use axum::{Json, extract::State};

use zada_core::SyncResult;

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::Order;
use crate::services::{OrderService, PlaceOrderRequest};
use crate::state::AppState;

/// GET /api/orders
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<SyncResult<Vec<Order>>>> {
    let orders = OrderService::new(state.gateway(), state.keys(), state.events());
    Ok(Json(orders.list(user.id).await?))
}

/// POST /api/orders
pub async fn place(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<Json<SyncResult<Order>>> {
    let orders = OrderService::new(state.gateway(), state.keys(), state.events());
    let order = orders.place(user.id, request).await?;
    Ok(Json(SyncResult::ok(order)))
}
