//! Seed the catalog with demo products.
//!
//! Writes go through the sync gateway, so seeding works even when the remote
//! store is unreachable; the products land in the local cache and sync on
//! the next successful write.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use zada_core::{Price, ProductId};
use zada_storefront::models::{Product, tables};
use zada_storefront::remote::RemoteWrite;
use zada_storefront::sync::SyncError;

/// Seed the catalog with demo products.
///
/// # Errors
///
/// Returns an error if configuration is missing or the local cache cannot
/// be written.
pub async fn products() -> Result<(), Box<dyn std::error::Error>> {
    let (gateway, keys) = super::open_gateway().await?;

    let catalog = demo_products();
    info!(count = catalog.len(), "Seeding demo products");

    for product in &catalog {
        let op = RemoteWrite::upsert_row(tables::PRODUCTS, product).map_err(SyncError::Encode)?;
        gateway.write(&keys.products(), &op, &catalog).await?;
        info!(id = %product.id, name = %product.name, "Seeded");
    }

    info!("Seeding complete");
    Ok(())
}

fn demo_products() -> Vec<Product> {
    let specs: [(&str, &str, &str, i64, u32, i64); 4] = [
        (
            "Still Water",
            "Spring-sourced still water",
            "19L",
            650,
            2,
            120,
        ),
        ("Still Water", "Spring-sourced still water", "5L", 250, 2, 300),
        (
            "Sparkling Water",
            "Lightly carbonated",
            "1L",
            120,
            2,
            500,
        ),
        ("Mineral Water", "High mineral content", "1.5L", 150, 2, 400),
    ];

    specs
        .into_iter()
        .enumerate()
        .map(|(i, (name, description, volume, cents, scale, stock))| Product {
            id: ProductId::new(i64::try_from(i).unwrap_or(0) + 1),
            name: name.to_string(),
            description: description.to_string(),
            volume: volume.to_string(),
            price: Price::new(Decimal::new(cents, scale)),
            stock,
            image_url: None,
            created_at: Utc::now(),
        })
        .collect()
}
