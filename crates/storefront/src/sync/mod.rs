//! Local-first sync gateway.
//!
//! Mediates every domain read/write between the remote authoritative store
//! and the local persistent key-value cache. The precedence rule is fixed:
//!
//! - Reads try the remote first under a bounded retry; a non-empty result is
//!   normalized, written back to the local cache, and returned. Any remote
//!   failure (transport, non-2xx, API error, or an empty result, which is
//!   indistinguishable from failure) falls back to the local snapshot, or to
//!   the empty default when no snapshot exists.
//! - Writes try the remote first, then always persist the full collection
//!   snapshot locally. A write succeeds if either side accepted it; it fails
//!   only when local persistence itself fails. There is no queue and no
//!   retry-on-reconnect: an offline write stays local-only until the next
//!   successful remote write of the same collection.
//!
//! Within one call the state machine never revisits the remote after falling
//! back; the next call starts over. Offline is the expected case and never
//! raises; only corrupted local data or local I/O failure does.

mod normalize;
mod retry;

pub use normalize::{normalize_row, normalize_rows};
pub use retry::RetryPolicy;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use zada_core::{StorageKey, SyncResult};

use crate::local::{LocalStore, LocalStoreError};
use crate::remote::{RemoteError, RemoteQuery, RemoteStore, RemoteWrite};

/// Errors the gateway raises to callers.
///
/// Deliberately narrow: transient remote failures are swallowed into the
/// fallback path and never appear here.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A previously written local value no longer decodes.
    #[error("corrupted local data under {key}: {source}")]
    CorruptLocal {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Local persistence failed; there is no further fallback below it.
    #[error("local store error: {0}")]
    Local(#[from] LocalStoreError),

    /// A value could not be JSON-encoded for the local snapshot.
    #[error("serialization error: {0}")]
    Encode(serde_json::Error),
}

/// Why a remote read attempt did not produce rows.
#[derive(Debug)]
enum ReadFailure {
    Remote(RemoteError),
    Empty,
}

impl std::fmt::Display for ReadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(e) => write!(f, "{e}"),
            Self::Empty => write!(f, "empty result (indistinguishable from failure)"),
        }
    }
}

/// The local-first sync gateway.
///
/// Generic over the remote store so tests can script outages and latency.
#[derive(Debug, Clone)]
pub struct SyncGateway<R> {
    remote: R,
    local: LocalStore,
    retry: RetryPolicy,
}

impl<R: RemoteStore> SyncGateway<R> {
    /// Create a gateway over a remote store and a local cache.
    pub const fn new(remote: R, local: LocalStore, retry: RetryPolicy) -> Self {
        Self {
            remote,
            local,
            retry,
        }
    }

    /// The remote store, for callers that need a raw remote attempt with
    /// their own fallback representation (e.g. the admin dashboard snapshot).
    pub const fn remote(&self) -> &R {
        &self.remote
    }

    /// The retry policy in effect.
    pub const fn retry(&self) -> RetryPolicy {
        self.retry
    }

    // =========================================================================
    // Read path
    // =========================================================================

    /// Read a collection: remote first, local snapshot on failure.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` only for corrupted local data or local I/O
    /// failure. Remote unavailability is not an error.
    #[instrument(skip(self, query), fields(key = %key, table = %query.table))]
    pub async fn read<T>(
        &self,
        key: &StorageKey,
        query: &RemoteQuery,
    ) -> Result<SyncResult<Vec<T>>, SyncError>
    where
        T: DeserializeOwned + Serialize,
    {
        match self.try_remote_read(query).await {
            Ok(rows) => {
                let rows = normalize_rows(rows);
                match decode_rows::<T>(rows) {
                    Ok(typed) => {
                        // Refresh the snapshot so a later outage serves this result
                        self.write_back(key, &typed).await;
                        Ok(SyncResult::ok(typed))
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "remote rows failed to decode, falling back to local");
                        self.read_local(key).await
                    }
                }
            }
            Err(failure) => {
                tracing::debug!(reason = %failure, "falling back to local snapshot");
                self.read_local(key).await
            }
        }
    }

    /// Remote select under the bounded retry policy. An empty result counts
    /// as a failure and consumes attempts like one.
    async fn try_remote_read(&self, query: &RemoteQuery) -> Result<Vec<Value>, ReadFailure> {
        self.retry
            .run(|| async {
                match self.remote.select(query).await {
                    Ok(rows) if rows.is_empty() => Err(ReadFailure::Empty),
                    Ok(rows) => Ok(rows),
                    Err(e) => Err(ReadFailure::Remote(e)),
                }
            })
            .await
    }

    /// Read the local snapshot for `key`, or the empty default.
    async fn read_local<T: DeserializeOwned>(
        &self,
        key: &StorageKey,
    ) -> Result<SyncResult<Vec<T>>, SyncError> {
        match self.local.get_item(key).await? {
            Some(raw) => {
                let typed =
                    serde_json::from_str::<Vec<T>>(&raw).map_err(|source| SyncError::CorruptLocal {
                        key: key.to_string(),
                        source,
                    })?;
                Ok(SyncResult::ok(typed))
            }
            None => Ok(SyncResult::ok(Vec::new())),
        }
    }

    /// Best-effort snapshot refresh after a successful remote read.
    async fn write_back<T: Serialize>(&self, key: &StorageKey, rows: &[T]) {
        match serde_json::to_string(rows) {
            Ok(encoded) => {
                if let Err(e) = self.local.set_item(key, &encoded).await {
                    tracing::warn!(key = %key, error = %e, "write-back of remote read failed");
                }
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "write-back encoding failed");
            }
        }
    }

    // =========================================================================
    // Write path
    // =========================================================================

    /// Write a collection: remote operation first, then always persist the
    /// full snapshot locally.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` only when the snapshot cannot be encoded or local
    /// persistence fails. A remote failure alone still succeeds; the write
    /// is then local-only until the next successful remote write.
    #[instrument(skip(self, op, snapshot), fields(key = %key))]
    pub async fn write<T>(
        &self,
        key: &StorageKey,
        op: &RemoteWrite,
        snapshot: &[T],
    ) -> Result<SyncResult<()>, SyncError>
    where
        T: Serialize + Sync,
    {
        let remote_accepted = self.try_remote_write(op).await;
        if !remote_accepted {
            tracing::warn!(key = %key, "remote write failed; value is local-only until resynced");
        }

        let encoded = serde_json::to_string(snapshot).map_err(SyncError::Encode)?;
        self.local.set_item(key, &encoded).await?;

        Ok(SyncResult::ok(()))
    }

    async fn try_remote_write(&self, op: &RemoteWrite) -> bool {
        let outcome = self
            .retry
            .run(|| async {
                match op {
                    RemoteWrite::Upsert { table, rows } => self.remote.upsert(table, rows).await,
                    RemoteWrite::Delete { table, filter } => self.remote.delete(table, filter).await,
                }
            })
            .await;
        outcome.is_ok()
    }

    // =========================================================================
    // Local-only records
    // =========================================================================
    //
    // Some keys (current_user, the admin dashboard snapshot) have no remote
    // table; they live only in the local store but still go through the
    // gateway so every persisted key is handled in one place.

    /// Persist a local-only record under `key`.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if encoding or local persistence fails.
    pub async fn stash<T: Serialize>(&self, key: &StorageKey, value: &T) -> Result<(), SyncError> {
        let encoded = serde_json::to_string(value).map_err(SyncError::Encode)?;
        self.local.set_item(key, &encoded).await?;
        Ok(())
    }

    /// Read a local-only record, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` for corrupted data or local I/O failure.
    pub async fn read_stash<T: DeserializeOwned>(
        &self,
        key: &StorageKey,
    ) -> Result<Option<T>, SyncError> {
        match self.local.get_item(key).await? {
            Some(raw) => {
                let value =
                    serde_json::from_str(&raw).map_err(|source| SyncError::CorruptLocal {
                        key: key.to_string(),
                        source,
                    })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Remove a key from the local store. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` for local I/O failure.
    pub async fn discard(&self, key: &StorageKey) -> Result<(), SyncError> {
        self.local.remove_item(key).await?;
        Ok(())
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, serde_json::Error> {
    rows.into_iter().map(serde_json::from_value).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    use serde::Deserialize;
    use serde_json::json;

    use crate::remote::Filter;
    use zada_core::KeyNamespace;

    /// Unit-test remote: a fixed response for every select, recorded upserts.
    struct ScriptedRemote {
        select_result: Mutex<Option<Result<Vec<Value>, ()>>>,
        upserts: Mutex<Vec<(String, Vec<Value>)>>,
    }

    impl ScriptedRemote {
        fn returning(rows: Vec<Value>) -> Self {
            Self {
                select_result: Mutex::new(Some(Ok(rows))),
                upserts: Mutex::new(Vec::new()),
            }
        }

        fn unavailable() -> Self {
            Self {
                select_result: Mutex::new(Some(Err(()))),
                upserts: Mutex::new(Vec::new()),
            }
        }
    }

    impl RemoteStore for ScriptedRemote {
        async fn select(&self, _query: &RemoteQuery) -> Result<Vec<Value>, RemoteError> {
            match self.select_result.lock().unwrap().clone() {
                Some(Ok(rows)) => Ok(rows),
                _ => Err(RemoteError::Api("scripted outage".into())),
            }
        }

        async fn upsert(&self, table: &str, rows: &[Value]) -> Result<(), RemoteError> {
            if self.select_result.lock().unwrap().clone() == Some(Err(())) {
                return Err(RemoteError::Api("scripted outage".into()));
            }
            self.upserts
                .lock()
                .unwrap()
                .push((table.to_string(), rows.to_vec()));
            Ok(())
        }

        async fn delete(&self, _table: &str, _filter: &Filter) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: i64,
        price: zada_core::Price,
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("zada-sync-test-{}", uuid::Uuid::new_v4()))
    }

    async fn gateway(remote: ScriptedRemote) -> SyncGateway<ScriptedRemote> {
        let local = LocalStore::open(temp_dir()).await.unwrap();
        SyncGateway::new(remote, local, RetryPolicy::new(3, Duration::from_millis(1000)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_remote_success_normalizes_and_returns() {
        let remote = ScriptedRemote::returning(vec![json!({"id": 1, "price": "12.50"})]);
        let gateway = gateway(remote).await;
        let key = KeyNamespace::new("t").products();

        let result: SyncResult<Vec<Row>> = gateway
            .read(&key, &RemoteQuery::table("products"))
            .await
            .unwrap();

        assert!(result.success);
        let rows = result.into_data().unwrap();
        assert_eq!(rows[0].price.to_string(), "12.50");
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_writes_back_to_local() {
        let remote = ScriptedRemote::returning(vec![json!({"id": 1, "price": 3})]);
        let gateway = gateway(remote).await;
        let key = KeyNamespace::new("t").products();

        let _: SyncResult<Vec<Row>> = gateway
            .read(&key, &RemoteQuery::table("products"))
            .await
            .unwrap();

        // Kill the remote; the snapshot must now serve the same rows
        *gateway.remote().select_result.lock().unwrap() = Some(Err(()));
        let offline: SyncResult<Vec<Row>> = gateway
            .read(&key, &RemoteQuery::table("products"))
            .await
            .unwrap();
        assert_eq!(offline.into_data().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_falls_back_without_raising() {
        let gateway = gateway(ScriptedRemote::unavailable()).await;
        let key = KeyNamespace::new("t").products();

        let result: SyncResult<Vec<Row>> = gateway
            .read(&key, &RemoteQuery::table("products"))
            .await
            .unwrap();

        // No local value either: empty default, still success
        assert!(result.success);
        assert_eq!(result.into_data().unwrap(), Vec::<Row>::new());
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_persists_locally_when_remote_down() {
        let gateway = gateway(ScriptedRemote::unavailable()).await;
        let key = KeyNamespace::new("t").products();
        let rows = vec![Row {
            id: 1,
            price: zada_core::Price::default(),
        }];

        let op = RemoteWrite::upsert_row("products", &rows[0]).unwrap();
        let written = gateway.write(&key, &op, &rows).await.unwrap();
        assert!(written.success);

        let read: SyncResult<Vec<Row>> = gateway
            .read(&key, &RemoteQuery::table("products"))
            .await
            .unwrap();
        assert_eq!(read.into_data().unwrap(), rows);
    }

    #[tokio::test(start_paused = true)]
    async fn test_corrupt_local_raises() {
        let gateway = gateway(ScriptedRemote::unavailable()).await;
        let key = KeyNamespace::new("t").products();

        gateway.stash(&key, &"not an array").await.unwrap();

        let result: Result<SyncResult<Vec<Row>>, _> =
            gateway.read(&key, &RemoteQuery::table("products")).await;
        assert!(matches!(result, Err(SyncError::CorruptLocal { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stash_roundtrip_and_discard() {
        let gateway = gateway(ScriptedRemote::unavailable()).await;
        let key = KeyNamespace::new("t").current_user();

        gateway.stash(&key, &json!({"id": 9})).await.unwrap();
        let value: Option<Value> = gateway.read_stash(&key).await.unwrap();
        assert_eq!(value, Some(json!({"id": 9})));

        gateway.discard(&key).await.unwrap();
        let value: Option<Value> = gateway.read_stash(&key).await.unwrap();
        assert!(value.is_none());
    }
}
