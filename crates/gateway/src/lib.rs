//! Spokeshop Gateway - typed HTTP client for the backend gateway.
//!
//! The gateway fronts four backend services (products, inventory, users,
//! orders) behind a single base URL. This crate wraps that REST surface in
//! one [`GatewayClient`] with:
//!
//! - JSON body serialization and typed responses
//! - bearer-token injection on every call once a session token is set
//! - uniform error mapping: 401/403 become [`GatewayError::Unauthorized`]
//!   (and drop the stored token), everything else carries a best-effort
//!   message extracted from the response body
//! - a short-lived `moka` cache for catalog pages, invalidated by any
//!   order or admin product write
//!
//! # Example
//!
//! ```rust,ignore
//! use spokeshop_gateway::{GatewayClient, GatewayConfig};
//!
//! let client = GatewayClient::new(&GatewayConfig::from_env()?)?;
//! let login = client.login("alice", "hunter22").await?;
//! client.set_token(login.token.clone());
//! let page = client.products_page(0, 6).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
mod config;
mod error;
pub mod types;

pub use client::GatewayClient;
pub use config::{ConfigError, GatewayConfig};
pub use error::GatewayError;
