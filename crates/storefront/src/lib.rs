//! Spokeshop Storefront - shopper-facing application logic.
//!
//! This crate is the shopper side of the client: browsing the paginated
//! catalog, registering and logging in, buying a bike with one click, and
//! managing the shopper's own orders. All persistence lives behind the
//! backend gateway; the only local state is a small JSON session store.
//!
//! The [`Storefront`] facade wires the pieces together and owns the session
//! lifecycle: any call the gateway rejects with 401/403 clears the stored
//! session and surfaces [`StorefrontError::SessionExpired`].

#![cfg_attr(not(test), forbid(unsafe_code))]

mod app;
mod auth;
mod cart;
mod catalog;
mod error;
mod session;

pub use app::{CancelOutcome, PurchaseOutcome, Storefront};
pub use auth::{AuthService, RegistrationForm};
pub use cart::{CartView, PendingGuard};
pub use catalog::{CatalogPager, LoadOutcome, PAGE_SIZE, PageRequest, stock_level};
pub use error::StorefrontError;
pub use session::{SessionStore, SessionStoreError, session_keys};
