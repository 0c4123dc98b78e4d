//! Shopping cart service.
//!
//! One cart per user, keyed `{prefix}_user_{id}_cart`. Every mutation writes
//! the full cart snapshot through the gateway, so the cart survives offline
//! sessions and restarts on this device.

use thiserror::Error;

use zada_core::{KeyNamespace, Price, ProductId, SyncResult, UserId, UserScope};

use crate::models::{CartItem, Product, cart_total, tables};
use crate::remote::{Filter, RemoteQuery, RemoteStore, RemoteWrite};
use crate::sync::{SyncError, SyncGateway};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product is not in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Sync gateway error (corrupted cache, local I/O).
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),
}

/// Cart contents plus the running total, as returned to clients.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total: Price,
}

impl CartView {
    fn of(items: Vec<CartItem>) -> Self {
        let total = cart_total(&items);
        Self { items, total }
    }
}

/// Shopping cart service.
pub struct CartService<'a, R> {
    gateway: &'a SyncGateway<R>,
    keys: &'a KeyNamespace,
}

impl<'a, R: RemoteStore> CartService<'a, R> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(gateway: &'a SyncGateway<R>, keys: &'a KeyNamespace) -> Self {
        Self { gateway, keys }
    }

    /// The user's cart with its running total.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Sync` for corrupted cache or local I/O failure.
    pub async fn view(&self, user_id: UserId) -> Result<SyncResult<CartView>, CartError> {
        Ok(self.items(user_id).await?.map(CartView::of))
    }

    /// Add a product to the cart, or bump its quantity if already present.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Sync` if the snapshot cannot be persisted locally.
    pub async fn add(
        &self,
        user_id: UserId,
        product: &Product,
        quantity: u32,
    ) -> Result<CartView, CartError> {
        let mut items = self.items(user_id).await?.into_data().unwrap_or_default();

        match items.iter_mut().find(|i| i.product_id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => items.push(CartItem::for_product(user_id, product, quantity)),
        }

        // Whole line goes up, not just the delta: the remote upsert is keyed
        // by (user_id, product_id) and replaces the row.
        let updated = items
            .iter()
            .find(|i| i.product_id == product.id)
            .cloned()
            .ok_or(CartError::NotInCart(product.id))?;
        let op = RemoteWrite::upsert_row(tables::CART_ITEMS, &updated).map_err(SyncError::Encode)?;

        self.persist(user_id, &op, items).await
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` if the product has no line in the cart.
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartView, CartError> {
        if quantity == 0 {
            return self.remove(user_id, product_id).await;
        }

        let mut items = self.items(user_id).await?.into_data().unwrap_or_default();
        let line = items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or(CartError::NotInCart(product_id))?;
        line.quantity = quantity;

        let updated = line.clone();
        let op = RemoteWrite::upsert_row(tables::CART_ITEMS, &updated).map_err(SyncError::Encode)?;

        self.persist(user_id, &op, items).await
    }

    /// Remove one product line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` if the product has no line in the cart.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartView, CartError> {
        let mut items = self.items(user_id).await?.into_data().unwrap_or_default();
        let before = items.len();
        items.retain(|i| i.product_id != product_id);
        if items.len() == before {
            return Err(CartError::NotInCart(product_id));
        }

        let op = RemoteWrite::delete(tables::CART_ITEMS, line_filter(user_id, product_id));
        self.persist(user_id, &op, items).await
    }

    /// Empty the cart, typically after checkout.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Sync` if the snapshot cannot be persisted locally.
    pub async fn clear(&self, user_id: UserId) -> Result<(), CartError> {
        let op = RemoteWrite::delete(
            tables::CART_ITEMS,
            Filter::all().eq("user_id", user_id.as_i64()),
        );
        self.persist(user_id, &op, Vec::new()).await?;
        Ok(())
    }

    /// Raw cart lines for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Sync` for corrupted cache or local I/O failure.
    pub async fn items(&self, user_id: UserId) -> Result<SyncResult<Vec<CartItem>>, CartError> {
        let query = RemoteQuery::table(tables::CART_ITEMS)
            .filter(Filter::all().eq("user_id", user_id.as_i64()));
        Ok(self.gateway.read(&self.key(user_id), &query).await?)
    }

    async fn persist(
        &self,
        user_id: UserId,
        op: &RemoteWrite,
        items: Vec<CartItem>,
    ) -> Result<CartView, CartError> {
        self.gateway.write(&self.key(user_id), op, &items).await?;
        Ok(CartView::of(items))
    }

    fn key(&self, user_id: UserId) -> zada_core::StorageKey {
        self.keys.user_scoped(user_id, UserScope::Cart)
    }
}

fn line_filter(user_id: UserId, product_id: ProductId) -> Filter {
    Filter::all()
        .eq("user_id", user_id.as_i64())
        .eq("product_id", product_id.as_i64())
}
