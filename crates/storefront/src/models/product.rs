//! Product catalog types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use zada_core::{Price, ProductId};

/// A deliverable water product (bottle, dispenser, refill).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Container size as displayed, e.g. "19L" or "330ml x 24".
    pub volume: String,
    pub price: Price,
    /// Units available for delivery.
    pub stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
