//! Zada Core - Shared types library.
//!
//! This crate provides common types used across all Zada Water Delivery
//! components:
//! - `storefront` - Delivery ordering service (catalog, cart, orders, auth)
//! - `cli` - Command-line tools for seeding and cache management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no network access,
//! no storage access. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, roles,
//!   storage keys, and the `SyncResult` envelope

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
