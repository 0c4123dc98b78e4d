//! Storage key construction for the local key-value store.
//!
//! Every cached collection lives under a deterministic string key. Key
//! assembly is centralized here so the persisted namespace is a stable
//! contract rather than a convention scattered across call sites.
//!
//! Persisted namespace:
//!
//! - `{prefix}_users`
//! - `{prefix}_products`
//! - `{prefix}_current_user`
//! - `{prefix}_user_{id}_cart`
//! - `{prefix}_user_{id}_orders`
//! - `{prefix}_user_{id}_notifications`
//! - `{prefix}_user_{id}_admin_data`

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// A deterministic key identifying a cached collection.
///
/// Stable across process restarts for any (user, entity) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Wrap a raw key string. Prefer [`KeyNamespace`] for building keys;
    /// this exists for tooling that addresses the cache by literal key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-user cached entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserScope {
    Cart,
    Orders,
    Notifications,
    AdminData,
}

impl UserScope {
    const fn segment(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Orders => "orders",
            Self::Notifications => "notifications",
            Self::AdminData => "admin_data",
        }
    }

    /// All per-user scopes, in a fixed order. Used when clearing a user's
    /// cached data at logout.
    pub const ALL: [Self; 4] = [Self::Cart, Self::Orders, Self::Notifications, Self::AdminData];
}

/// Factory for [`StorageKey`]s under a fixed namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNamespace {
    prefix: String,
}

impl KeyNamespace {
    /// Create a namespace with the given prefix (e.g. `"zada"`).
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The namespace prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key for the global users collection.
    #[must_use]
    pub fn users(&self) -> StorageKey {
        StorageKey(format!("{}_users", self.prefix))
    }

    /// Key for the global product catalog.
    #[must_use]
    pub fn products(&self) -> StorageKey {
        StorageKey(format!("{}_products", self.prefix))
    }

    /// Key for the currently authenticated user snapshot.
    #[must_use]
    pub fn current_user(&self) -> StorageKey {
        StorageKey(format!("{}_current_user", self.prefix))
    }

    /// Key for a per-user entity collection.
    #[must_use]
    pub fn user_scoped(&self, user_id: UserId, scope: UserScope) -> StorageKey {
        StorageKey(format!(
            "{}_user_{}_{}",
            self.prefix,
            user_id,
            scope.segment()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_keys() {
        let ns = KeyNamespace::new("zada");
        assert_eq!(ns.users().as_str(), "zada_users");
        assert_eq!(ns.products().as_str(), "zada_products");
        assert_eq!(ns.current_user().as_str(), "zada_current_user");
    }

    #[test]
    fn test_user_scoped_keys() {
        let ns = KeyNamespace::new("zada");
        let user = UserId::new(17);
        assert_eq!(
            ns.user_scoped(user, UserScope::Cart).as_str(),
            "zada_user_17_cart"
        );
        assert_eq!(
            ns.user_scoped(user, UserScope::Orders).as_str(),
            "zada_user_17_orders"
        );
        assert_eq!(
            ns.user_scoped(user, UserScope::Notifications).as_str(),
            "zada_user_17_notifications"
        );
        assert_eq!(
            ns.user_scoped(user, UserScope::AdminData).as_str(),
            "zada_user_17_admin_data"
        );
    }

    #[test]
    fn test_keys_are_deterministic() {
        let a = KeyNamespace::new("zada").user_scoped(UserId::new(3), UserScope::Cart);
        let b = KeyNamespace::new("zada").user_scoped(UserId::new(3), UserScope::Cart);
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_users_get_distinct_keys() {
        let ns = KeyNamespace::new("zada");
        assert_ne!(
            ns.user_scoped(UserId::new(1), UserScope::Cart),
            ns.user_scoped(UserId::new(2), UserScope::Cart)
        );
    }
}
