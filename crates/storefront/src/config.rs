//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ZADA_REMOTE_URL` - Base URL of the remote table API
//! - `ZADA_REMOTE_API_KEY` - API key for the remote table API
//!
//! ## Optional
//! - `ZADA_HOST` - Bind address (default: 127.0.0.1)
//! - `ZADA_PORT` - Listen port (default: 3000)
//! - `ZADA_LOCAL_STORE_DIR` - Directory for the local key-value cache
//!   (default: ./zada-local-store)
//! - `ZADA_STORAGE_NAMESPACE` - Prefix for local storage keys (default: zada)
//! - `ZADA_SYNC_RETRY_ATTEMPTS` - Remote attempts per operation (default: 3)
//! - `ZADA_SYNC_RETRY_DELAY_MS` - Fixed delay between attempts (default: 1000)
//! - `ZADA_REMOTE_TIMEOUT_SECS` - Hard per-request timeout (default: 10)
//! - `ZADA_SESSION_TTL_SECS` - Session expiry (default: 7 days)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Remote table API configuration
    pub remote: RemoteConfig,
    /// Directory backing the local key-value store
    pub local_store_dir: PathBuf,
    /// Namespace prefix for local storage keys
    pub storage_namespace: String,
    /// Sync gateway retry policy
    pub sync: SyncConfig,
    /// Session time-to-live
    pub session_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Remote table API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct RemoteConfig {
    /// Base URL of the remote table API
    pub endpoint: url::Url,
    /// API key sent with every request
    pub api_key: SecretString,
    /// Hard per-request timeout, independent of the retry budget
    pub request_timeout: Duration,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"[REDACTED]")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Retry policy knobs for the sync gateway.
///
/// Fixed attempt count with a fixed linear delay. There is deliberately no
/// exponential backoff, jitter, or circuit breaker: all remote errors are
/// treated as retryable, then as fallback triggers.
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// Remote attempts per operation
    pub retry_attempts: u32,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("ZADA_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ZADA_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ZADA_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ZADA_PORT".to_string(), e.to_string()))?;

        let remote = RemoteConfig::from_env()?;
        let local_store_dir =
            PathBuf::from(get_env_or_default("ZADA_LOCAL_STORE_DIR", "./zada-local-store"));
        let storage_namespace = get_env_or_default("ZADA_STORAGE_NAMESPACE", "zada");

        let sync = SyncConfig {
            retry_attempts: parse_env_or_default("ZADA_SYNC_RETRY_ATTEMPTS", 3)?,
            retry_delay: Duration::from_millis(parse_env_or_default(
                "ZADA_SYNC_RETRY_DELAY_MS",
                1000,
            )?),
        };

        let session_ttl = Duration::from_secs(parse_env_or_default(
            "ZADA_SESSION_TTL_SECS",
            7 * 24 * 60 * 60,
        )?);
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            remote,
            local_store_dir,
            storage_namespace,
            sync,
            session_ttl,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl RemoteConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let endpoint = get_required_env("ZADA_REMOTE_URL")?;
        let endpoint = url::Url::parse(&endpoint)
            .map_err(|e| ConfigError::InvalidEnvVar("ZADA_REMOTE_URL".to_string(), e.to_string()))?;

        Ok(Self {
            endpoint,
            api_key: get_validated_secret("ZADA_REMOTE_API_KEY")?,
            request_timeout: Duration::from_secs(parse_env_or_default(
                "ZADA_REMOTE_TIMEOUT_SECS",
                10,
            )?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable into a number, with a default.
fn parse_env_or_default<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
