//! Spokeshop Core - Shared types library.
//!
//! This crate provides common types used across all Spokeshop components:
//! - `gateway` - Typed HTTP client for the backend gateway
//! - `storefront` - Public shopping surface (catalog, cart, auth)
//! - `admin` - Administration console (products, users, orders)
//! - `cli` - Command-line entry point
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, statuses, stock levels,
//!   and the gateway's page envelope

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
