//! Delivery order types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use zada_core::{OrderId, OrderStatus, Price, ProductId, UserId};

use super::CartItem;

/// One line of an order, frozen at checkout prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub volume: String,
    pub unit_price: Price,
    pub quantity: u32,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            volume: item.volume.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
        }
    }
}

/// A delivery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total: Price,
    pub status: OrderStatus,
    pub delivery_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_normalized_remote_row() {
        let row = json!({
            "id": 12,
            "user_id": 3,
            "items": [
                {"product_id": 1, "name": "19L Bottle", "volume": "19L", "unit_price": 6.5, "quantity": 2}
            ],
            "total": 13.0,
            "status": "out_for_delivery",
            "delivery_address": "12 Harbor Rd",
            "created_at": "2024-05-01T10:30:00+00:00",
            "updated_at": "2024-05-02T08:00:00+00:00"
        });

        let order: Order = serde_json::from_value(row).unwrap();
        assert_eq!(order.status, OrderStatus::OutForDelivery);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total.to_string(), "13.00");
        assert!(order.note.is_none());
    }
}
