//! Product catalog route handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use zada_core::{ProductId, SyncResult};

use crate::error::{AppError, Result};
use crate::models::Product;
use crate::services::CatalogService;
use crate::state::AppState;

/// GET /api/products
pub async fn index(State(state): State<AppState>) -> Result<Json<SyncResult<Vec<Product>>>> {
    let catalog = CatalogService::new(state.gateway(), state.keys(), state.catalog_cache());
    Ok(Json(catalog.list().await?))
}

/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SyncResult<Product>>> {
    let catalog = CatalogService::new(state.gateway(), state.keys(), state.catalog_cache());
    let product = catalog
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(Json(SyncResult::ok(product)))
}
