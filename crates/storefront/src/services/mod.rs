//! Domain services.
//!
//! Each service owns one or more entity collections and is the only writer
//! of its own state. All durable reads and writes go through the sync
//! gateway; services add validation, identity assignment, and domain rules
//! on top.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod notifications;
pub mod orders;
pub mod session;

pub use admin::{AdminService, Dashboard};
pub use auth::{AuthError, AuthService, RegisterRequest};
pub use cart::{CartError, CartService, CartView};
pub use catalog::CatalogService;
pub use notifications::NotificationService;
pub use orders::{OrderError, OrderService, PlaceOrderRequest};
pub use session::SessionStore;
