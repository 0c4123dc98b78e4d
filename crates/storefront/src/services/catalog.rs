//! Product catalog service.
//!
//! Reads go through a short-lived in-memory cache so the hot product listing
//! doesn't hit the remote store on every request. Writes invalidate the cache
//! and flow through the sync gateway like every other collection.

use std::sync::Arc;

use moka::future::Cache;

use zada_core::{KeyNamespace, ProductId, SyncResult};

use crate::models::{Product, tables};
use crate::remote::{Filter, OrderBy, RemoteQuery, RemoteStore, RemoteWrite};
use crate::sync::{SyncError, SyncGateway};

/// Cache key for the product list. Single entry; the whole catalog is small
/// enough to cache as one unit.
const LIST_KEY: &str = "products";

/// Product catalog service.
pub struct CatalogService<'a, R> {
    gateway: &'a SyncGateway<R>,
    keys: &'a KeyNamespace,
    cache: &'a Cache<&'static str, Arc<Vec<Product>>>,
}

impl<'a, R: RemoteStore> CatalogService<'a, R> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(
        gateway: &'a SyncGateway<R>,
        keys: &'a KeyNamespace,
        cache: &'a Cache<&'static str, Arc<Vec<Product>>>,
    ) -> Self {
        Self { gateway, keys, cache }
    }

    /// List the catalog, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` for corrupted cache or local I/O failure.
    pub async fn list(&self) -> Result<SyncResult<Vec<Product>>, SyncError> {
        if let Some(cached) = self.cache.get(LIST_KEY).await {
            return Ok(SyncResult::ok(cached.as_ref().clone()));
        }

        let result = self.fetch().await?;
        if let Some(products) = result.data.as_ref() {
            self.cache
                .insert(LIST_KEY, Arc::new(products.clone()))
                .await;
        }
        Ok(result)
    }

    /// Look up one product by ID.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` for corrupted cache or local I/O failure.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, SyncError> {
        let result = self.list().await?;
        Ok(result
            .into_data()
            .unwrap_or_default()
            .into_iter()
            .find(|p| p.id == id))
    }

    /// Create or update a product.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the snapshot cannot be persisted locally.
    pub async fn upsert(&self, product: Product) -> Result<Product, SyncError> {
        let mut products = self.fetch().await?.into_data().unwrap_or_default();

        let op = RemoteWrite::upsert_row(tables::PRODUCTS, &product).map_err(SyncError::Encode)?;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product.clone(),
            None => products.push(product.clone()),
        }

        self.gateway
            .write(&self.keys.products(), &op, &products)
            .await?;
        self.cache.invalidate(LIST_KEY).await;

        tracing::info!(product_id = %product.id, name = %product.name, "product upserted");
        Ok(product)
    }

    /// Delete a product. Removing an unknown ID is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the snapshot cannot be persisted locally.
    pub async fn delete(&self, id: ProductId) -> Result<(), SyncError> {
        let mut products = self.fetch().await?.into_data().unwrap_or_default();
        products.retain(|p| p.id != id);

        let op = RemoteWrite::delete(tables::PRODUCTS, Filter::all().eq("id", id.as_i64()));
        self.gateway
            .write(&self.keys.products(), &op, &products)
            .await?;
        self.cache.invalidate(LIST_KEY).await;

        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Fetch the catalog through the gateway, bypassing the in-memory cache.
    async fn fetch(&self) -> Result<SyncResult<Vec<Product>>, SyncError> {
        let query = RemoteQuery::table(tables::PRODUCTS).order(OrderBy::desc("created_at"));
        self.gateway.read(&self.keys.products(), &query).await
    }
}
