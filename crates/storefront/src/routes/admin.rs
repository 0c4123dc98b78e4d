//! Admin route handlers.
//!
//! Every route here sits behind the `RequireAdmin` extractor.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::Deserialize;

use zada_core::{OrderId, OrderStatus, Price, ProductId, SyncResult, UserId};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Order, Product, PublicUser};
use crate::services::{AdminService, CatalogService, Dashboard, OrderService};
use crate::state::AppState;

/// Product create/update request body.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub volume: String,
    pub price: Price,
    pub stock: i64,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Order status change request body.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

/// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<SyncResult<Dashboard>>> {
    let service = AdminService::new(state.gateway(), state.keys());
    Ok(Json(service.dashboard(admin.id).await?))
}

/// GET /api/admin/users
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<SyncResult<Vec<PublicUser>>>> {
    let service = AdminService::new(state.gateway(), state.keys());
    let result = service.users().await?;
    Ok(Json(
        result.map(|users| users.iter().map(PublicUser::from).collect()),
    ))
}

/// POST /api/admin/products
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(request): Json<ProductRequest>,
) -> Result<Json<SyncResult<Product>>> {
    let catalog = CatalogService::new(state.gateway(), state.keys(), state.catalog_cache());

    let existing = catalog.list().await?.into_data().unwrap_or_default();
    let id = existing.iter().map(|p| p.id.as_i64()).max().unwrap_or(0) + 1;

    let product = catalog
        .upsert(build_product(ProductId::new(id), request))
        .await?;
    Ok(Json(SyncResult::ok(product)))
}

/// PUT /api/admin/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i64>,
    Json(request): Json<ProductRequest>,
) -> Result<Json<SyncResult<Product>>> {
    let catalog = CatalogService::new(state.gateway(), state.keys(), state.catalog_cache());
    let id = ProductId::new(id);

    let mut product = build_product(id, request);
    if let Some(existing) = catalog.get(id).await? {
        product.created_at = existing.created_at;
    }

    let product = catalog.upsert(product).await?;
    Ok(Json(SyncResult::ok(product)))
}

/// DELETE /api/admin/products/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<Json<SyncResult<()>>> {
    let catalog = CatalogService::new(state.gateway(), state.keys(), state.catalog_cache());
    catalog.delete(ProductId::new(id)).await?;
    Ok(Json(SyncResult::ok(())))
}

/// PUT /api/admin/orders/{user_id}/{order_id}/status
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path((user_id, order_id)): Path<(i64, i64)>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<SyncResult<Order>>> {
    let orders = OrderService::new(state.gateway(), state.keys(), state.events());
    let order = orders
        .update_status(
            UserId::new(user_id),
            OrderId::new(order_id),
            request.status,
        )
        .await?;
    Ok(Json(SyncResult::ok(order)))
}

fn build_product(id: ProductId, request: ProductRequest) -> Product {
    Product {
        id,
        name: request.name,
        description: request.description,
        volume: request.volume,
        price: request.price,
        stock: request.stock,
        image_url: request.image_url,
        created_at: Utc::now(),
    }
}
