//! User notification service.
//!
//! Notifications are stored per user under `{prefix}_user_{id}_notifications`
//! and also fanned out on an in-process broadcast channel so connected
//! clients can pick them up without polling.

use chrono::Utc;
use tokio::sync::broadcast;

use zada_core::{KeyNamespace, NotificationId, SyncResult, UserId, UserScope};

use crate::models::{Notification, tables};
use crate::remote::{Filter, OrderBy, RemoteQuery, RemoteStore, RemoteWrite};
use crate::sync::{SyncError, SyncGateway};

/// User notification service.
pub struct NotificationService<'a, R> {
    gateway: &'a SyncGateway<R>,
    keys: &'a KeyNamespace,
    events: &'a broadcast::Sender<Notification>,
}

impl<'a, R: RemoteStore> NotificationService<'a, R> {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(
        gateway: &'a SyncGateway<R>,
        keys: &'a KeyNamespace,
        events: &'a broadcast::Sender<Notification>,
    ) -> Self {
        Self {
            gateway,
            keys,
            events,
        }
    }

    /// The user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` for corrupted cache or local I/O failure.
    pub async fn list(&self, user_id: UserId) -> Result<SyncResult<Vec<Notification>>, SyncError> {
        let query = RemoteQuery::table(tables::NOTIFICATIONS)
            .filter(Filter::all().eq("user_id", user_id.as_i64()))
            .order(OrderBy::desc("created_at"));
        self.gateway.read(&self.key(user_id), &query).await
    }

    /// Push a notification to a user.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the snapshot cannot be persisted locally.
    pub async fn push(
        &self,
        user_id: UserId,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Notification, SyncError> {
        let mut items = self.list(user_id).await?.into_data().unwrap_or_default();

        let id = items.iter().map(|n| n.id.as_i64()).max().unwrap_or(0) + 1;
        let notification = Notification {
            id: NotificationId::new(id),
            user_id,
            title: title.into(),
            body: body.into(),
            read: false,
            created_at: Utc::now(),
        };

        let op = RemoteWrite::upsert_row(tables::NOTIFICATIONS, &notification)
            .map_err(SyncError::Encode)?;
        items.insert(0, notification.clone());
        self.gateway.write(&self.key(user_id), &op, &items).await?;

        // Nobody listening is fine; the durable copy is already written.
        let _ = self.events.send(notification.clone());

        Ok(notification)
    }

    /// Mark one notification as read. Unknown IDs are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the snapshot cannot be persisted locally.
    pub async fn mark_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> Result<(), SyncError> {
        let mut items = self.list(user_id).await?.into_data().unwrap_or_default();
        let Some(target) = items.iter_mut().find(|n| n.id == id) else {
            return Ok(());
        };
        target.read = true;

        let updated = target.clone();
        let op =
            RemoteWrite::upsert_row(tables::NOTIFICATIONS, &updated).map_err(SyncError::Encode)?;
        self.gateway.write(&self.key(user_id), &op, &items).await?;
        Ok(())
    }

    fn key(&self, user_id: UserId) -> zada_core::StorageKey {
        self.keys.user_scoped(user_id, UserScope::Notifications)
    }
}
