//! Command implementations.

pub mod admin;
pub mod auth;
pub mod shop;

use std::path::PathBuf;

use spokeshop_gateway::{GatewayClient, GatewayConfig};
use spokeshop_storefront::{SessionStore, Storefront};

/// Where the session file lives.
///
/// Override with `SPOKESHOP_SESSION`; defaults to a dotfile in the home
/// directory, falling back to the working directory.
fn session_path() -> PathBuf {
    dotenvy::dotenv().ok();
    if let Ok(path) = std::env::var("SPOKESHOP_SESSION") {
        return PathBuf::from(path);
    }
    std::env::var_os("HOME")
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(".spokeshop-session.json")
}

/// Build the shopper-facing application from the environment.
fn storefront() -> Result<Storefront, Box<dyn std::error::Error>> {
    let config = GatewayConfig::from_env()?;
    Ok(Storefront::new(&config, session_path())?)
}

/// Build a bare gateway client plus the shared session store.
fn gateway_with_session()
-> Result<(GatewayClient, SessionStore), Box<dyn std::error::Error>> {
    let config = GatewayConfig::from_env()?;
    let gateway = GatewayClient::new(&config)?;
    let store = SessionStore::open(session_path())?;
    Ok((gateway, store))
}
