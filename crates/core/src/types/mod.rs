//! Core type definitions.

mod id;
mod page;
mod status;

pub use id::{OrderId, ProductId, UserId};
pub use page::Page;
pub use status::{OrderStatus, Role, StockLevel};
