//! Spokeshop Admin - management console logic.
//!
//! The admin console manages the product catalog, inventory, user
//! accounts, and the full order log through the same backend gateway the
//! storefront uses. The interesting part is product saving: one logical
//! save fans out into up to three gateway writes (product fields, stock
//! count, shelf flag), and [`AdminConsole::save_product`] runs them as a
//! small saga that compensates when a later step fails.

#![cfg_attr(not(test), forbid(unsafe_code))]

mod console;
mod error;
mod products;

pub use console::AdminConsole;
pub use error::{AdminError, SaveStep};
pub use products::{ProductForm, ProductRow, merge_inventory};
