//! Admin dashboard service.
//!
//! The dashboard aggregates across every user's orders, which only the
//! remote store can see in one query; local snapshots are per user. A
//! freshly computed dashboard is stashed under the admin's `admin_data`
//! key so an outage serves the last good numbers instead of nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use zada_core::{KeyNamespace, OrderStatus, Price, SyncResult, UserId, UserScope};

use crate::models::{Order, Product, User, tables};
use crate::remote::{OrderBy, RemoteQuery, RemoteStore};
use crate::sync::{SyncError, SyncGateway, normalize_rows};

/// Point-in-time store metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub total_users: usize,
    pub total_products: usize,
    pub pending_orders: usize,
    pub confirmed_orders: usize,
    pub out_for_delivery_orders: usize,
    pub delivered_orders: usize,
    pub cancelled_orders: usize,
    /// Sum of delivered order totals.
    pub revenue: Price,
    pub generated_at: DateTime<Utc>,
    /// False when remote aggregation failed and these are the last stashed
    /// numbers.
    pub fresh: bool,
}

/// Admin dashboard service.
pub struct AdminService<'a, R> {
    gateway: &'a SyncGateway<R>,
    keys: &'a KeyNamespace,
}

impl<'a, R: RemoteStore> AdminService<'a, R> {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(gateway: &'a SyncGateway<R>, keys: &'a KeyNamespace) -> Self {
        Self { gateway, keys }
    }

    /// Build the dashboard for `admin_id`.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` for corrupted cache or local I/O failure.
    pub async fn dashboard(&self, admin_id: UserId) -> Result<SyncResult<Dashboard>, SyncError> {
        let users = self
            .gateway
            .read::<User>(&self.keys.users(), &RemoteQuery::table(tables::USERS))
            .await?
            .into_data()
            .unwrap_or_default();
        let products = self
            .gateway
            .read::<Product>(&self.keys.products(), &RemoteQuery::table(tables::PRODUCTS))
            .await?
            .into_data()
            .unwrap_or_default();

        let stash_key = self.keys.user_scoped(admin_id, UserScope::AdminData);

        match self.all_orders().await {
            Some(orders) => {
                let dashboard = summarize(&users, &products, &orders);
                self.gateway.stash(&stash_key, &dashboard).await?;
                Ok(SyncResult::ok(dashboard))
            }
            None => {
                tracing::warn!("order aggregation unavailable, serving stashed dashboard");
                match self.gateway.read_stash::<Dashboard>(&stash_key).await? {
                    Some(mut stale) => {
                        stale.fresh = false;
                        Ok(SyncResult::ok(stale))
                    }
                    None => Ok(SyncResult::err("dashboard unavailable while offline")),
                }
            }
        }
    }

    /// All customers, for the admin user listing.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` for corrupted cache or local I/O failure.
    pub async fn users(&self) -> Result<SyncResult<Vec<User>>, SyncError> {
        self.gateway
            .read(&self.keys.users(), &RemoteQuery::table(tables::USERS))
            .await
    }

    /// Every order in the store, straight from the remote. `None` when the
    /// remote is unreachable or returns nothing.
    async fn all_orders(&self) -> Option<Vec<Order>> {
        let query = RemoteQuery::table(tables::ORDERS).order(OrderBy::desc("created_at"));
        let rows = self
            .gateway
            .retry()
            .run(|| async { self.gateway.remote().select(&query).await })
            .await
            .ok()?;

        let rows = normalize_rows(rows);
        rows.into_iter()
            .map(|row| serde_json::from_value::<Order>(row).ok())
            .collect()
    }
}

fn summarize(users: &[User], products: &[Product], orders: &[Order]) -> Dashboard {
    let count = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count();

    Dashboard {
        total_users: users.len(),
        total_products: products.len(),
        pending_orders: count(OrderStatus::Pending),
        confirmed_orders: count(OrderStatus::Confirmed),
        out_for_delivery_orders: count(OrderStatus::OutForDelivery),
        delivered_orders: count(OrderStatus::Delivered),
        cancelled_orders: count(OrderStatus::Cancelled),
        revenue: orders
            .iter()
            .filter(|o| o.status == OrderStatus::Delivered)
            .map(|o| o.total)
            .sum(),
        generated_at: Utc::now(),
        fresh: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use zada_core::OrderId;

    fn order(id: i64, status: OrderStatus, total: i64) -> Order {
        Order {
            id: OrderId::new(id),
            user_id: UserId::new(1),
            items: Vec::new(),
            total: Price::new(Decimal::from(total)),
            status,
            delivery_address: "12 Canal St".to_string(),
            note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summarize_counts_and_revenue() {
        let orders = vec![
            order(1, OrderStatus::Pending, 10),
            order(2, OrderStatus::Delivered, 25),
            order(3, OrderStatus::Delivered, 15),
            order(4, OrderStatus::Cancelled, 99),
        ];

        let dashboard = summarize(&[], &[], &orders);
        assert_eq!(dashboard.pending_orders, 1);
        assert_eq!(dashboard.delivered_orders, 2);
        assert_eq!(dashboard.cancelled_orders, 1);
        assert_eq!(dashboard.revenue, Price::new(Decimal::from(40)));
        assert!(dashboard.fresh);
    }
}
