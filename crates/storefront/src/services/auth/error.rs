//! Authentication error types.

use thiserror::Error;

use crate::sync::SyncError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] zada_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Admin accounts must use the company email domain.
    #[error("admin accounts must use an @{0} address")]
    AdminEmailDomain(&'static str),

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Sync gateway error (corrupted cache, local I/O).
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),
}
