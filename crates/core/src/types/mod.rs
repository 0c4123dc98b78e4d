//! Core types for Zada Water Delivery.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod key;
pub mod price;
pub mod role;
pub mod sync;

pub use email::{Email, EmailError};
pub use id::*;
pub use key::{KeyNamespace, StorageKey, UserScope};
pub use price::Price;
pub use role::*;
pub use sync::SyncResult;
