//! Session management.
//!
//! Sessions are an explicit object held in application state, not a
//! module-level singleton: a TTL'd in-memory map from bearer token to the
//! authenticated user. Tokens are opaque and random; expiry is handled by
//! the cache itself.

use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

use zada_core::UserId;

use crate::models::PublicUser;

/// In-memory session store keyed by bearer token.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, PublicUser>,
}

impl SessionStore {
    /// Create a store whose sessions expire `ttl` after issuance.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(ttl)
                .support_invalidation_closures()
                .build(),
        }
    }

    /// Issue a fresh token for an authenticated user.
    pub async fn issue(&self, user: PublicUser) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(token.clone(), user).await;
        token
    }

    /// Look up the user behind a token, if the session is still live.
    pub async fn get(&self, token: &str) -> Option<PublicUser> {
        self.sessions.get(token).await
    }

    /// Revoke one token.
    pub async fn revoke(&self, token: &str) {
        self.sessions.invalidate(token).await;
    }

    /// Revoke every session belonging to a user (e.g. after a role change).
    pub async fn revoke_user(&self, user_id: UserId) {
        // Predicate invalidation runs lazily inside moka
        let _ = self
            .sessions
            .invalidate_entries_if(move |_, user| user.id == user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use zada_core::{Email, UserRole};

    fn user(id: i64) -> PublicUser {
        PublicUser {
            id: UserId::new(id),
            email: Email::parse("a@zada.com").expect("valid"),
            role: UserRole::Customer,
            name: "A".to_string(),
            phone: None,
            address: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_issue_and_get() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.issue(user(1)).await;

        let found = store.get(&token).await.expect("session live");
        assert_eq!(found.id, UserId::new(1));
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert!(store.get("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_revoke() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.issue(user(1)).await;
        store.revoke(&token).await;
        assert!(store.get(&token).await.is_none());
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let store = SessionStore::new(Duration::from_secs(60));
        let a = store.issue(user(1)).await;
        let b = store.issue(user(1)).await;
        assert_ne!(a, b);
    }
}
