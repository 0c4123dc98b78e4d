//! Local sync cache inspection and cleanup.
//!
//! Operates directly on the file-backed store the gateway falls back to.
//! `clear` wipes every cached snapshot; the next successful remote read
//! repopulates them.

use tracing::{info, warn};

use zada_core::StorageKey;
use zada_storefront::config::StorefrontConfig;
use zada_storefront::local::LocalStore;

/// List cached storage keys.
///
/// # Errors
///
/// Returns an error if configuration is missing or the cache directory
/// cannot be read.
pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store().await?;
    let keys = store.keys().await?;

    if keys.is_empty() {
        info!("Cache is empty");
        return Ok(());
    }

    for key in keys {
        info!("{key}");
    }
    Ok(())
}

/// Print the cached value for one key.
///
/// # Errors
///
/// Returns an error if configuration is missing or the value cannot be read.
pub async fn show(key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store().await?;

    match store.get_item(&StorageKey::new(key)).await? {
        Some(value) => {
            // Pretty-print when the value is JSON, raw otherwise
            match serde_json::from_str::<serde_json::Value>(&value) {
                Ok(parsed) => info!("{}", serde_json::to_string_pretty(&parsed)?),
                Err(_) => info!("{value}"),
            }
        }
        None => warn!(key, "No cached value"),
    }
    Ok(())
}

/// Remove every cached value.
///
/// # Errors
///
/// Returns an error if configuration is missing or a value cannot be removed.
pub async fn clear() -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store().await?;
    let keys = store.keys().await?;
    let count = keys.len();

    for key in keys {
        store.remove_item(&StorageKey::new(key)).await?;
    }

    info!(count, "Cache cleared");
    Ok(())
}

async fn open_store() -> Result<LocalStore, Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    Ok(LocalStore::open(&config.local_store_dir).await?)
}
