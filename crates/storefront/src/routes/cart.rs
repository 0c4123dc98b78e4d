//! Cart route handlers.
//!
//! All cart routes operate on the logged-in user's own cart.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use zada_core::{ProductId, SyncResult};

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::services::{CartService, CartView, CatalogService};
use crate::state::AppState;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// Quantity-update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// GET /api/cart
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<SyncResult<CartView>>> {
    let cart = CartService::new(state.gateway(), state.keys());
    Ok(Json(cart.view(user.id).await?))
}

/// POST /api/cart/items
pub async fn add_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<SyncResult<CartView>>> {
    if request.quantity == 0 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
    }

    let product_id = ProductId::new(request.product_id);
    let catalog = CatalogService::new(state.gateway(), state.keys(), state.catalog_cache());
    let product = catalog
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
    if product.stock < i64::from(request.quantity) {
        return Err(AppError::BadRequest("insufficient stock".to_string()));
    }

    let cart = CartService::new(state.gateway(), state.keys());
    let view = cart.add(user.id, &product, request.quantity).await?;
    Ok(Json(SyncResult::ok(view)))
}

/// PUT /api/cart/items/{product_id}
pub async fn update_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<i64>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<SyncResult<CartView>>> {
    let cart = CartService::new(state.gateway(), state.keys());
    let view = cart
        .update_quantity(user.id, ProductId::new(product_id), request.quantity)
        .await?;
    Ok(Json(SyncResult::ok(view)))
}

/// DELETE /api/cart/items/{product_id}
pub async fn remove_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<i64>,
) -> Result<Json<SyncResult<CartView>>> {
    let cart = CartService::new(state.gateway(), state.keys());
    let view = cart.remove(user.id, ProductId::new(product_id)).await?;
    Ok(Json(SyncResult::ok(view)))
}

/// DELETE /api/cart
pub async fn clear(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<SyncResult<()>>> {
    let cart = CartService::new(state.gateway(), state.keys());
    cart.clear(user.id).await?;
    Ok(Json(SyncResult::ok(())))
}
