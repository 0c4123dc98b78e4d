//! Application state shared across handlers.

use std::sync::Arc;

use moka::future::Cache;
use tokio::sync::broadcast;

use zada_core::KeyNamespace;

use crate::config::StorefrontConfig;
use crate::local::{LocalStore, LocalStoreError};
use crate::models::{Notification, Product};
use crate::remote::RestStore;
use crate::services::SessionStore;
use crate::sync::{RetryPolicy, SyncGateway};

/// Catalog cache TTL. Short on purpose: admin edits from another instance
/// should show up within a minute.
const CATALOG_TTL: std::time::Duration = std::time::Duration::from_secs(60);

/// Capacity of the notification fan-out channel before slow receivers lag.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("local store error: {0}")]
    Local(#[from] LocalStoreError),
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the sync gateway and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    keys: KeyNamespace,
    gateway: SyncGateway<RestStore>,
    sessions: SessionStore,
    catalog_cache: Cache<&'static str, Arc<Vec<Product>>>,
    events: broadcast::Sender<Notification>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store directory cannot be created or the
    /// HTTP client cannot be built.
    pub async fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let local = LocalStore::open(&config.local_store_dir).await?;
        let remote = RestStore::new(&config.remote)?;
        let gateway = SyncGateway::new(remote, local, RetryPolicy::from(config.sync));

        let keys = KeyNamespace::new(&config.storage_namespace);
        let sessions = SessionStore::new(config.session_ttl);
        let catalog_cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(CATALOG_TTL)
            .build();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                keys,
                gateway,
                sessions,
                catalog_cache,
                events,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the storage key namespace.
    #[must_use]
    pub fn keys(&self) -> &KeyNamespace {
        &self.inner.keys
    }

    /// Get a reference to the sync gateway.
    #[must_use]
    pub fn gateway(&self) -> &SyncGateway<RestStore> {
        &self.inner.gateway
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// Get a reference to the in-memory catalog cache.
    #[must_use]
    pub fn catalog_cache(&self) -> &Cache<&'static str, Arc<Vec<Product>>> {
        &self.inner.catalog_cache
    }

    /// Get a reference to the notification fan-out channel.
    #[must_use]
    pub fn events(&self) -> &broadcast::Sender<Notification> {
        &self.inner.events
    }
}
