//! Wire types for the gateway REST surface.
//!
//! Shapes follow the backend services exactly; fields the client never uses
//! (and must never display, like passwords) are simply not modeled.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spokeshop_core::{OrderId, OrderStatus, ProductId, Role, UserId};

/// A bicycle product as returned by the product service.
///
/// `stock` is not part of the product entity; the listing DTO attaches it
/// and the category endpoint sometimes omits it entirely, so it stays
/// optional here. Admin views resolve the authoritative count from the
/// inventory service instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub brand: String,
    pub model: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gear_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    /// Listing-DTO stock annotation; absent on some endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl Product {
    /// Display name in the storefront's `brand - model` form.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.brand, self.model)
    }
}

/// Payload for creating or updating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub brand: String,
    pub model: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gear_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            id: Some(product.id.clone()),
            brand: product.brand.clone(),
            model: product.model.clone(),
            category: product.category.clone(),
            price: product.price,
            gear_system: product.gear_system.clone(),
            frame_size: product.frame_size.clone(),
            color: product.color.clone(),
            image_url: product.image_url.clone(),
        }
    }
}

/// A user account. Passwords are never returned to or held by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Client-generated secondary identifier (`user-<millis>-<n>`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

/// Registration payload. The `user_id` is generated client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub user_id: String,
    pub username: String,
    pub password: String,
    pub phone: String,
    pub age: u32,
    pub role: Role,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response: a bearer token plus the user it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// An order as returned by the order service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub product_id: ProductId,
    pub buyer_id: UserId,
    pub quantity: u32,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

/// Order creation payload (the storefront always buys quantity 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub product_id: ProductId,
    pub buyer_id: UserId,
    pub quantity: u32,
}

/// Admin order row with product and buyer details denormalized for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrder {
    pub id: OrderId,
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
    pub buyer_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<String>,
    pub quantity: u32,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

impl AdminOrder {
    /// Row total, `None` when the product (and its price) is gone.
    #[must_use]
    pub fn total(&self) -> Option<Decimal> {
        self.price.map(|price| price * Decimal::from(self.quantity))
    }
}

/// Stock write request for the inventory service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Envelope around the on-shelf product id listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnShelfIds {
    #[serde(default)]
    pub data: Vec<ProductId>,
}
