//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! zada-cli admin create -e ops@zada.com -n "Ops" -p "change-me-now"
//! ```
//!
//! # Environment Variables
//!
//! Uses the same `ZADA_*` variables as the storefront binary; the account is
//! created through the sync gateway, so it works offline too.

use tracing::info;

use zada_core::UserRole;
use zada_storefront::services::{AuthService, RegisterRequest};

/// Create a new admin user.
///
/// # Errors
///
/// Returns an error if configuration is missing, validation fails (admin
/// accounts must be on the company email domain), or the account cannot be
/// persisted.
pub async fn create_user(
    email: &str,
    name: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (gateway, keys) = super::open_gateway().await?;
    let auth = AuthService::new(&gateway, &keys);

    let user = auth
        .register(RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            role: UserRole::Admin,
            name: name.to_string(),
            phone: None,
            address: None,
        })
        .await?;

    info!(id = %user.id, email = %user.email.as_str(), "Admin user created");
    Ok(())
}
