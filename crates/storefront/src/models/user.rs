//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use zada_core::{Email, UserId, UserRole};

/// A registered account, as stored in the users collection.
///
/// Carries the Argon2id password hash; never serialize this shape into an
/// API response; convert to [`PublicUser`] first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub password_hash: String,
    pub role: UserRole,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user with credentials stripped: API responses and the locally stashed
/// `current_user` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            name: user.name.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_public_user_has_no_hash() {
        let user = User {
            id: UserId::new(1),
            email: Email::parse("a@zada.com").unwrap(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".to_string(),
            role: UserRole::Customer,
            name: "A".to_string(),
            phone: None,
            address: None,
            created_at: Utc::now(),
        };

        let public = PublicUser::from(&user);
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
    }
}
