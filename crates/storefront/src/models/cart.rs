//! Shopping cart types.

use serde::{Deserialize, Serialize};

use zada_core::{Price, ProductId, UserId};

use super::Product;

/// One line item in a user's cart.
///
/// Remote rows are keyed by (`user_id`, `product_id`); the local snapshot is
/// the whole collection for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub name: String,
    pub volume: String,
    pub unit_price: Price,
    pub quantity: u32,
}

impl CartItem {
    /// Build a line item for `quantity` units of a product.
    #[must_use]
    pub fn for_product(user_id: UserId, product: &Product, quantity: u32) -> Self {
        Self {
            user_id,
            product_id: product.id,
            name: product.name.clone(),
            volume: product.volume.clone(),
            unit_price: product.price,
            quantity,
        }
    }

    /// The line total (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Sum of all line totals in a cart.
#[must_use]
pub fn cart_total(items: &[CartItem]) -> Price {
    items.iter().map(CartItem::line_total).sum()
}
