//! Integration tests for Zada Water Delivery.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p zada-integration-tests
//! ```
//!
//! These tests run fully in-process: the sync gateway is built against a
//! scriptable [`MockRemote`] and a real file-backed local store in a unique
//! temp directory. Tests script outages, latency, and canned rows on the
//! mock, then drive the services exactly as the HTTP handlers would.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;

use zada_core::KeyNamespace;
use zada_storefront::local::LocalStore;
use zada_storefront::remote::{Filter, RemoteError, RemoteQuery, RemoteStore};
use zada_storefront::sync::{RetryPolicy, SyncGateway};

/// Scriptable in-memory remote store.
///
/// Cloning shares the underlying state, so a test can keep a handle and
/// flip the store offline after the gateway has taken ownership of its
/// copy.
#[derive(Clone, Default)]
pub struct MockRemote {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    offline: bool,
    tables: HashMap<String, Vec<Value>>,
    upsert_latencies: VecDeque<Duration>,
    select_calls: u32,
    upsert_calls: u32,
}

impl MockRemote {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every remote call fail from now on.
    pub fn go_offline(&self) {
        self.lock().offline = true;
    }

    /// Restore remote availability.
    pub fn go_online(&self) {
        self.lock().offline = false;
    }

    /// Replace a table's rows with canned values.
    pub fn seed_table(&self, table: &str, rows: Vec<Value>) {
        self.lock().tables.insert(table.to_string(), rows);
    }

    /// Rows currently held for a table.
    #[must_use]
    pub fn table(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// Queue a latency for the next upsert calls, consumed in order. Calls
    /// beyond the queue complete immediately.
    pub fn push_upsert_latency(&self, latency: Duration) {
        self.lock().upsert_latencies.push_back(latency);
    }

    /// Number of select calls made so far.
    #[must_use]
    pub fn select_calls(&self) -> u32 {
        self.lock().select_calls
    }

    /// Number of upsert calls made so far.
    #[must_use]
    pub fn upsert_calls(&self) -> u32 {
        self.lock().upsert_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }
}

impl RemoteStore for MockRemote {
    async fn select(&self, query: &RemoteQuery) -> Result<Vec<Value>, RemoteError> {
        let rows = {
            let mut state = self.lock();
            state.select_calls += 1;
            if state.offline {
                return Err(RemoteError::Api("remote unavailable".to_string()));
            }
            state
                .tables
                .get(&query.table)
                .map(|rows| {
                    rows.iter()
                        .filter(|row| query.filter.matches(row))
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        };
        Ok(rows)
    }

    async fn upsert(&self, table: &str, rows: &[Value]) -> Result<(), RemoteError> {
        let latency = {
            let mut state = self.lock();
            state.upsert_calls += 1;
            state.upsert_latencies.pop_front()
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.lock();
        if state.offline {
            return Err(RemoteError::Api("remote unavailable".to_string()));
        }
        let stored = state.tables.entry(table.to_string()).or_default();
        for row in rows {
            match stored.iter_mut().find(|existing| same_key(existing, row)) {
                Some(existing) => *existing = row.clone(),
                None => stored.push(row.clone()),
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), RemoteError> {
        let mut state = self.lock();
        if state.offline {
            return Err(RemoteError::Api("remote unavailable".to_string()));
        }
        if let Some(stored) = state.tables.get_mut(table) {
            stored.retain(|row| !filter.matches(row));
        }
        Ok(())
    }
}

/// Primary-key equality for mock rows: `id` when present, the
/// `(user_id, product_id)` pair for cart lines.
fn same_key(a: &Value, b: &Value) -> bool {
    match (a.get("id"), b.get("id")) {
        (Some(left), Some(right)) => left == right,
        _ => {
            a.get("user_id").is_some()
                && a.get("user_id") == b.get("user_id")
                && a.get("product_id") == b.get("product_id")
        }
    }
}

/// One gateway over a mock remote and a throwaway local store directory.
pub struct TestContext {
    pub gateway: SyncGateway<MockRemote>,
    pub remote: MockRemote,
    pub keys: KeyNamespace,
    dir: std::path::PathBuf,
}

impl TestContext {
    /// Build a context with the default retry policy (3 attempts, 1s apart).
    ///
    /// # Panics
    ///
    /// Panics if the temp directory cannot be created.
    pub async fn new() -> Self {
        Self::with_retry(RetryPolicy::new(3, Duration::from_millis(1000))).await
    }

    /// Build a context with a single-attempt policy, for tests that don't
    /// exercise retries and shouldn't pay for them.
    ///
    /// # Panics
    ///
    /// Panics if the temp directory cannot be created.
    pub async fn fast() -> Self {
        Self::with_retry(RetryPolicy::new(1, Duration::ZERO)).await
    }

    async fn with_retry(retry: RetryPolicy) -> Self {
        let dir = std::env::temp_dir().join(format!("zada-it-{}", uuid::Uuid::new_v4()));
        let local = LocalStore::open(&dir).await.expect("open local store");

        let remote = MockRemote::new();
        let gateway = SyncGateway::new(remote.clone(), local, retry);

        Self {
            gateway,
            remote,
            keys: KeyNamespace::new("zada"),
            dir,
        }
    }

    /// Directory backing the local store, for tests that tamper with the
    /// cached files directly.
    #[must_use]
    pub fn local_dir(&self) -> &std::path::Path {
        &self.dir
    }
}
