//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (local store writable)
//!
//! # Auth
//! POST /api/auth/register       - Create an account
//! POST /api/auth/login          - Login, returns a bearer token
//! POST /api/auth/logout         - Logout, clears this user's cached data
//! GET  /api/auth/me             - Current user
//!
//! # Products
//! GET  /api/products            - Product listing
//! GET  /api/products/{id}       - Product detail
//!
//! # Cart (requires auth)
//! GET    /api/cart                      - Cart with running total
//! DELETE /api/cart                      - Empty the cart
//! POST   /api/cart/items                - Add a product
//! PUT    /api/cart/items/{product_id}   - Set quantity (0 removes)
//! DELETE /api/cart/items/{product_id}   - Remove a line
//!
//! # Orders (requires auth)
//! GET  /api/orders              - Order history
//! POST /api/orders              - Place an order from the cart
//!
//! # Notifications (requires auth)
//! GET  /api/notifications           - Notification list
//! POST /api/notifications/{id}/read - Mark one read
//!
//! # Admin (requires admin)
//! GET    /api/admin/dashboard   - Store metrics
//! GET    /api/admin/users       - User listing
//! POST   /api/admin/products    - Create a product
//! PUT    /api/admin/products/{id}    - Update a product
//! DELETE /api/admin/products/{id}    - Delete a product
//! PUT    /api/admin/orders/{user_id}/{order_id}/status - Change order status
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod notifications;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{product_id}",
            put(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/", get(orders::index).post(orders::place))
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::index))
        .route("/{id}/read", post(notifications::mark_read))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/users", get(admin::users))
        .route("/products", post(admin::create_product))
        .route(
            "/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route(
            "/orders/{user_id}/{order_id}/status",
            put(admin::update_order_status),
        )
}

/// Create all routes for the storefront API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/notifications", notification_routes())
        .nest("/api/admin", admin_routes())
}
