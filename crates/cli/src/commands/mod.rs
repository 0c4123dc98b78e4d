//! CLI command implementations.

pub mod admin;
pub mod cache;
pub mod seed;

use zada_core::KeyNamespace;
use zada_storefront::config::StorefrontConfig;
use zada_storefront::local::LocalStore;
use zada_storefront::remote::RestStore;
use zada_storefront::sync::{RetryPolicy, SyncGateway};

/// Build a sync gateway from the ambient environment, the same way the
/// storefront binary does.
pub async fn open_gateway()
-> Result<(SyncGateway<RestStore>, KeyNamespace), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let local = LocalStore::open(&config.local_store_dir).await?;
    let remote = RestStore::new(&config.remote)?;
    let keys = KeyNamespace::new(&config.storage_namespace);
    Ok((
        SyncGateway::new(remote, local, RetryPolicy::from(config.sync)),
        keys,
    ))
}
