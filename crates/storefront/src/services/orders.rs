//! Order service.
//!
//! Orders are placed from the current cart, stored per user under
//! `{prefix}_user_{id}_orders`, and move through the delivery status
//! lifecycle. Status changes notify the customer.

use chrono::Utc;
use thiserror::Error;
use tokio::sync::broadcast;

use zada_core::{KeyNamespace, OrderId, OrderStatus, SyncResult, UserId, UserScope};

use crate::models::{Notification, Order, OrderItem, cart_total, tables};
use crate::remote::{Filter, OrderBy, RemoteQuery, RemoteStore, RemoteWrite};
use crate::services::{CartService, NotificationService};
use crate::sync::{SyncError, SyncGateway};

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Cannot place an order from an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// A delivery address is required.
    #[error("delivery address is required")]
    MissingAddress,

    /// No such order for this user.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The requested status change is not a legal transition.
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Sync gateway error (corrupted cache, local I/O).
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),
}

impl From<crate::services::CartError> for OrderError {
    fn from(e: crate::services::CartError) -> Self {
        match e {
            crate::services::CartError::Sync(e) => Self::Sync(e),
            crate::services::CartError::NotInCart(_) => Self::EmptyCart,
        }
    }
}

/// Order placement request.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PlaceOrderRequest {
    pub delivery_address: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Order service.
pub struct OrderService<'a, R> {
    gateway: &'a SyncGateway<R>,
    keys: &'a KeyNamespace,
    events: &'a broadcast::Sender<Notification>,
}

impl<'a, R: RemoteStore> OrderService<'a, R> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(
        gateway: &'a SyncGateway<R>,
        keys: &'a KeyNamespace,
        events: &'a broadcast::Sender<Notification>,
    ) -> Self {
        Self {
            gateway,
            keys,
            events,
        }
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Sync` for corrupted cache or local I/O failure.
    pub async fn list(&self, user_id: UserId) -> Result<SyncResult<Vec<Order>>, OrderError> {
        let query = RemoteQuery::table(tables::ORDERS)
            .filter(Filter::all().eq("user_id", user_id.as_i64()))
            .order(OrderBy::desc("created_at"));
        Ok(self.gateway.read(&self.key(user_id), &query).await?)
    }

    /// Place an order from the user's current cart, then empty the cart and
    /// notify the customer.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyCart` if the cart has no lines and
    /// `OrderError::MissingAddress` if no delivery address was given.
    pub async fn place(
        &self,
        user_id: UserId,
        request: PlaceOrderRequest,
    ) -> Result<Order, OrderError> {
        let address = request.delivery_address.trim();
        if address.is_empty() {
            return Err(OrderError::MissingAddress);
        }

        let cart = CartService::new(self.gateway, self.keys);
        let items = cart.items(user_id).await?.into_data().unwrap_or_default();
        if items.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let total = cart_total(&items);
        let mut orders = self.list(user_id).await?.into_data().unwrap_or_default();
        let id = orders.iter().map(|o| o.id.as_i64()).max().unwrap_or(0) + 1;

        let now = Utc::now();
        let order = Order {
            id: OrderId::new(id),
            user_id,
            items: items.iter().map(OrderItem::from).collect(),
            total,
            status: OrderStatus::Pending,
            delivery_address: address.to_string(),
            note: request.note,
            created_at: now,
            updated_at: now,
        };

        let op = RemoteWrite::upsert_row(tables::ORDERS, &order).map_err(SyncError::Encode)?;
        orders.insert(0, order.clone());
        self.gateway.write(&self.key(user_id), &op, &orders).await?;

        cart.clear(user_id).await?;

        let notifications = NotificationService::new(self.gateway, self.keys, self.events);
        notifications
            .push(
                user_id,
                "Order received",
                format!("Order #{} is pending confirmation.", order.id),
            )
            .await?;

        tracing::info!(order_id = %order.id, user_id = %user_id, total = %order.total, "order placed");
        Ok(order)
    }

    /// Move an order to a new status, enforcing the lifecycle, and notify
    /// the customer.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for an unknown order and
    /// `OrderError::InvalidTransition` for an illegal status change.
    pub async fn update_status(
        &self,
        user_id: UserId,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let mut orders = self.list(user_id).await?.into_data().unwrap_or_default();
        let order = orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or(OrderError::NotFound(order_id))?;

        if !order.status.can_transition_to(status) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: status,
            });
        }

        order.status = status;
        order.updated_at = Utc::now();
        let updated = order.clone();

        let op = RemoteWrite::upsert_row(tables::ORDERS, &updated).map_err(SyncError::Encode)?;
        self.gateway.write(&self.key(user_id), &op, &orders).await?;

        let notifications = NotificationService::new(self.gateway, self.keys, self.events);
        notifications
            .push(
                user_id,
                "Order update",
                format!("Order #{} is now {}.", updated.id, updated.status),
            )
            .await?;

        tracing::info!(order_id = %updated.id, status = %updated.status, "order status updated");
        Ok(updated)
    }

    fn key(&self, user_id: UserId) -> zada_core::StorageKey {
        self.keys.user_scoped(user_id, UserScope::Orders)
    }
}
