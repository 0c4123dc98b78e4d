//! Cart mutation and order lifecycle flows.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::broadcast;

use zada_core::{OrderStatus, ProductId, UserId};
use zada_integration_tests::TestContext;
use zada_storefront::models::{Notification, Product};
use zada_storefront::services::{
    CartError, CartService, NotificationService, OrderError, OrderService, PlaceOrderRequest,
};

fn product(id: i64, price: f64, stock: i64) -> Product {
    serde_json::from_value(json!({
        "id": id,
        "name": "Still Water",
        "description": "",
        "volume": "19L",
        "price": price,
        "stock": stock,
        "image_url": null,
        "created_at": "2024-05-01T10:00:00+00:00",
    }))
    .expect("product")
}

#[tokio::test]
async fn add_update_and_remove_cart_lines() {
    let ctx = TestContext::fast().await;
    let cart = CartService::new(&ctx.gateway, &ctx.keys);
    let user = UserId::new(1);

    let view = cart.add(user, &product(1, 6.5, 10), 2).await.expect("add");
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.total.to_string(), "13.00");

    // Adding the same product bumps the existing line
    let view = cart.add(user, &product(1, 6.5, 10), 1).await.expect("add");
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items.first().expect("line").quantity, 3);

    let view = cart
        .update_quantity(user, ProductId::new(1), 5)
        .await
        .expect("update");
    assert_eq!(view.total.to_string(), "32.50");

    let view = cart.remove(user, ProductId::new(1)).await.expect("remove");
    assert!(view.items.is_empty());
    assert_eq!(view.total.to_string(), "0.00");
}

#[tokio::test]
async fn quantity_zero_removes_the_line() {
    let ctx = TestContext::fast().await;
    let cart = CartService::new(&ctx.gateway, &ctx.keys);
    let user = UserId::new(1);

    cart.add(user, &product(1, 6.5, 10), 2).await.expect("add");
    cart.add(user, &product(2, 1.2, 50), 4).await.expect("add");

    let view = cart
        .update_quantity(user, ProductId::new(1), 0)
        .await
        .expect("zero removes");
    assert_eq!(view.items.len(), 1);
    assert_eq!(
        view.items.first().expect("line").product_id,
        ProductId::new(2)
    );
}

#[tokio::test]
async fn updating_an_absent_line_is_an_error() {
    let ctx = TestContext::fast().await;
    let cart = CartService::new(&ctx.gateway, &ctx.keys);

    let err = cart
        .update_quantity(UserId::new(1), ProductId::new(9), 3)
        .await
        .expect_err("absent line");
    assert!(matches!(err, CartError::NotInCart(_)));
}

#[tokio::test]
async fn carts_are_isolated_per_user() {
    let ctx = TestContext::fast().await;
    let cart = CartService::new(&ctx.gateway, &ctx.keys);

    cart.add(UserId::new(1), &product(1, 6.5, 10), 1)
        .await
        .expect("add");
    cart.add(UserId::new(2), &product(2, 1.2, 50), 3)
        .await
        .expect("add");

    let one = cart.view(UserId::new(1)).await.expect("view").into_data().expect("data");
    let two = cart.view(UserId::new(2)).await.expect("view").into_data().expect("data");
    assert_eq!(one.items.len(), 1);
    assert_eq!(two.items.len(), 1);
    assert_ne!(
        one.items.first().expect("line").product_id,
        two.items.first().expect("line").product_id
    );
}

#[tokio::test(start_paused = true)]
async fn slower_write_resolves_last_and_wins() {
    let ctx = Arc::new(TestContext::fast().await);
    let user = UserId::new(1);

    // First write is slow at the remote, second is fast. No merge happens:
    // whichever write resolves last owns the snapshot.
    ctx.remote.push_upsert_latency(Duration::from_millis(500));
    ctx.remote.push_upsert_latency(Duration::from_millis(10));

    let slow = {
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            let cart = CartService::new(&ctx.gateway, &ctx.keys);
            cart.add(user, &product(1, 6.5, 10), 7).await.expect("slow add")
        })
    };
    // Make sure the slow write grabs the first latency slot
    tokio::time::sleep(Duration::from_millis(1)).await;
    let fast = {
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            let cart = CartService::new(&ctx.gateway, &ctx.keys);
            cart.add(user, &product(2, 1.2, 50), 1).await.expect("fast add")
        })
    };

    slow.await.expect("join");
    fast.await.expect("join");

    // The slow write resolved last, so the cached cart is its snapshot:
    // one line, product 1, quantity 7.
    ctx.remote.go_offline();
    let cart = CartService::new(&ctx.gateway, &ctx.keys);
    let view = cart.view(user).await.expect("view").into_data().expect("data");
    assert_eq!(view.items.len(), 1);
    let line = view.items.first().expect("line");
    assert_eq!(line.product_id, ProductId::new(1));
    assert_eq!(line.quantity, 7);
}

#[tokio::test]
async fn placing_an_order_empties_the_cart_and_notifies() {
    let ctx = TestContext::fast().await;
    let (events, mut receiver) = broadcast::channel::<Notification>(8);
    let cart = CartService::new(&ctx.gateway, &ctx.keys);
    let orders = OrderService::new(&ctx.gateway, &ctx.keys, &events);
    let user = UserId::new(1);

    cart.add(user, &product(1, 6.5, 10), 2).await.expect("add");

    let order = orders
        .place(
            user,
            PlaceOrderRequest {
                delivery_address: "12 Canal St".to_string(),
                note: None,
            },
        )
        .await
        .expect("place");

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total.to_string(), "13.00");
    assert_eq!(order.items.len(), 1);

    // Cart is empty afterwards
    let view = cart.view(user).await.expect("view").into_data().expect("data");
    assert!(view.items.is_empty());

    // Customer was notified in-process too
    let event = receiver.try_recv().expect("notification event");
    assert_eq!(event.user_id, user);

    // And the notification is durable
    let notifications = NotificationService::new(&ctx.gateway, &ctx.keys, &events);
    let stored = notifications
        .list(user)
        .await
        .expect("list")
        .into_data()
        .expect("data");
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn order_requires_items_and_address() {
    let ctx = TestContext::fast().await;
    let (events, _receiver) = broadcast::channel::<Notification>(8);
    let orders = OrderService::new(&ctx.gateway, &ctx.keys, &events);
    let user = UserId::new(1);

    let err = orders
        .place(
            user,
            PlaceOrderRequest {
                delivery_address: "12 Canal St".to_string(),
                note: None,
            },
        )
        .await
        .expect_err("empty cart");
    assert!(matches!(err, OrderError::EmptyCart));

    let cart = CartService::new(&ctx.gateway, &ctx.keys);
    cart.add(user, &product(1, 6.5, 10), 1).await.expect("add");

    let err = orders
        .place(
            user,
            PlaceOrderRequest {
                delivery_address: "   ".to_string(),
                note: None,
            },
        )
        .await
        .expect_err("blank address");
    assert!(matches!(err, OrderError::MissingAddress));
}

#[tokio::test]
async fn order_status_follows_the_lifecycle() {
    let ctx = TestContext::fast().await;
    let (events, _receiver) = broadcast::channel::<Notification>(8);
    let cart = CartService::new(&ctx.gateway, &ctx.keys);
    let orders = OrderService::new(&ctx.gateway, &ctx.keys, &events);
    let user = UserId::new(1);

    cart.add(user, &product(1, 6.5, 10), 1).await.expect("add");
    let order = orders
        .place(
            user,
            PlaceOrderRequest {
                delivery_address: "12 Canal St".to_string(),
                note: None,
            },
        )
        .await
        .expect("place");

    // Skipping straight to delivered is rejected
    let err = orders
        .update_status(user, order.id, OrderStatus::Delivered)
        .await
        .expect_err("skip");
    assert!(matches!(err, OrderError::InvalidTransition { .. }));

    // The legal path works
    for status in [
        OrderStatus::Confirmed,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ] {
        let updated = orders
            .update_status(user, order.id, status)
            .await
            .expect("transition");
        assert_eq!(updated.status, status);
    }

    // Delivered is terminal
    let err = orders
        .update_status(user, order.id, OrderStatus::Cancelled)
        .await
        .expect_err("terminal");
    assert!(matches!(err, OrderError::InvalidTransition { .. }));
}

#[tokio::test]
async fn order_history_survives_an_outage() {
    let ctx = TestContext::fast().await;
    let (events, _receiver) = broadcast::channel::<Notification>(8);
    let cart = CartService::new(&ctx.gateway, &ctx.keys);
    let orders = OrderService::new(&ctx.gateway, &ctx.keys, &events);
    let user = UserId::new(1);

    cart.add(user, &product(1, 6.5, 10), 1).await.expect("add");
    let placed = orders
        .place(
            user,
            PlaceOrderRequest {
                delivery_address: "12 Canal St".to_string(),
                note: None,
            },
        )
        .await
        .expect("place");

    ctx.remote.go_offline();
    let history = orders
        .list(user)
        .await
        .expect("list")
        .into_data()
        .expect("data");
    assert_eq!(history.len(), 1);
    assert_eq!(history.first().expect("order").id, placed.id);
}
