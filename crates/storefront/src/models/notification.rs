//! User notification types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use zada_core::{NotificationId, UserId};

/// An in-app notification (order updates, delivery alerts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
