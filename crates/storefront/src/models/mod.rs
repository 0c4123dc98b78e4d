//! Domain types.
//!
//! These are the typed shapes of the rows the sync gateway reads and writes.
//! They double as the wire format for the JSON API.

pub mod cart;
pub mod notification;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{CartItem, cart_total};
pub use notification::Notification;
pub use order::{Order, OrderItem};
pub use product::Product;
pub use user::{PublicUser, User};

/// Remote table names.
pub mod tables {
    pub const USERS: &str = "users";
    pub const PRODUCTS: &str = "products";
    pub const CART_ITEMS: &str = "cart_items";
    pub const ORDERS: &str = "orders";
    pub const NOTIFICATIONS: &str = "notifications";
}
