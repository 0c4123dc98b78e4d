//! Authentication service.
//!
//! Registration, login, and logout over the users collection. Because every
//! durable read goes through the sync gateway, both registration and login
//! keep working against the local snapshot when the remote store is
//! unreachable.
//!
//! Passwords are hashed with Argon2id, uniformly: there is no plaintext
//! comparison path anywhere.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use serde::Deserialize;

use zada_core::{Email, KeyNamespace, UserId, UserRole, UserScope};

use crate::models::{PublicUser, User, tables};
use crate::remote::{RemoteQuery, RemoteWrite};
use crate::sync::SyncGateway;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Email domain required for admin accounts.
const ADMIN_EMAIL_DOMAIN: &str = "zada.com";

/// New-account request.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Authentication service.
pub struct AuthService<'a, R> {
    gateway: &'a SyncGateway<R>,
    keys: &'a KeyNamespace,
}

impl<'a, R: crate::remote::RemoteStore> AuthService<'a, R> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(gateway: &'a SyncGateway<R>, keys: &'a KeyNamespace) -> Self {
        Self { gateway, keys }
    }

    /// Register a new account.
    ///
    /// Validation (email shape, password strength, admin email gate) runs
    /// before any store is touched; a validation failure writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::AdminEmailDomain` for an admin role outside the company domain.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, request: RegisterRequest) -> Result<PublicUser, AuthError> {
        let email = Email::parse(&request.email)?;
        validate_password(&request.password)?;

        if request.role == UserRole::Admin && email.domain() != ADMIN_EMAIL_DOMAIN {
            return Err(AuthError::AdminEmailDomain(ADMIN_EMAIL_DOMAIN));
        }

        let password_hash = hash_password(&request.password)?;

        let mut users = self.all_users().await?;
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::UserAlreadyExists);
        }

        let id = next_user_id(&users);
        let user = User {
            id,
            email,
            password_hash,
            role: request.role,
            name: request.name,
            phone: request.phone,
            address: request.address,
            created_at: Utc::now(),
        };

        let op = RemoteWrite::upsert_row(tables::USERS, &user)
            .map_err(crate::sync::SyncError::Encode)?;
        users.push(user.clone());
        self.gateway.write(&self.keys.users(), &op, &users).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(PublicUser::from(&user))
    }

    /// Login with email and password.
    ///
    /// On success the sanitized user is stashed as `current_user` so the
    /// device remembers who was signed in across restarts.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<PublicUser, AuthError> {
        let email = Email::parse(email)?;

        let users = self.all_users().await?;
        let user = users
            .iter()
            .find(|u| u.email == email)
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        let public = PublicUser::from(user);
        self.gateway.stash(&self.keys.current_user(), &public).await?;

        tracing::info!(user_id = %public.id, "user logged in");
        Ok(public)
    }

    /// Log out: forget the current user and clear the user's cached cart
    /// and notifications. Other accounts' cached keys are left alone.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Sync` if the local store cannot be updated.
    pub async fn logout(&self, user_id: UserId) -> Result<(), AuthError> {
        self.gateway.discard(&self.keys.current_user()).await?;
        for scope in [UserScope::Cart, UserScope::Notifications] {
            self.gateway
                .discard(&self.keys.user_scoped(user_id, scope))
                .await?;
        }
        tracing::info!(user_id = %user_id, "user logged out");
        Ok(())
    }

    /// The user remembered by this device, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Sync` for corrupted cache or local I/O failure.
    pub async fn remembered_user(&self) -> Result<Option<PublicUser>, AuthError> {
        Ok(self.gateway.read_stash(&self.keys.current_user()).await?)
    }

    async fn all_users(&self) -> Result<Vec<User>, AuthError> {
        let result = self
            .gateway
            .read::<User>(&self.keys.users(), &RemoteQuery::table(tables::USERS))
            .await?;
        Ok(result.into_data().unwrap_or_default())
    }
}

/// Allocate the next user ID from the highest seen so far.
///
/// Deterministic and offline-safe; collisions on concurrent registration
/// from two devices resolve by upsert (last writer wins) like every other
/// collection write.
fn next_user_id(users: &[User]) -> UserId {
    let max = users.iter().map(|u| u.id.as_i64()).max().unwrap_or(0);
    UserId::new(max + 1)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_too_short() {
        assert!(matches!(
            validate_password("abc"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_password_minimum() {
        assert!(validate_password("secret1").is_ok());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("secret1", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_next_user_id() {
        assert_eq!(next_user_id(&[]), UserId::new(1));

        let users = vec![
            User {
                id: UserId::new(4),
                email: Email::parse("a@zada.com").unwrap(),
                password_hash: String::new(),
                role: UserRole::Customer,
                name: "A".to_string(),
                phone: None,
                address: None,
                created_at: Utc::now(),
            },
            User {
                id: UserId::new(2),
                email: Email::parse("b@zada.com").unwrap(),
                password_hash: String::new(),
                role: UserRole::Customer,
                name: "B".to_string(),
                phone: None,
                address: None,
                created_at: Utc::now(),
            },
        ];
        assert_eq!(next_user_id(&users), UserId::new(5));
    }
}
