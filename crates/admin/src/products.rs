//! Product table assembly and the product form.
//!
//! The backend splits product data across two services: the product
//! service owns the descriptive fields, the inventory service owns stock
//! counts and the shelf flag. The admin table joins them client-side with
//! [`merge_inventory`], which is pure so the join rules are testable
//! without a gateway.

use std::collections::HashMap;

use rust_decimal::Decimal;

use spokeshop_core::{ProductId, StockLevel};
use spokeshop_gateway::types::{Product, ProductInput};

use crate::error::AdminError;

/// One row of the admin product table: product fields joined with the
/// authoritative inventory state.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub product: Product,
    pub stock: u32,
    pub on_shelf: bool,
}

impl ProductRow {
    /// Stock level bucket for display.
    #[must_use]
    pub fn stock_level(&self) -> StockLevel {
        StockLevel::from_units(self.stock)
    }
}

/// Join products with inventory data.
///
/// A product missing from the stock map shows zero stock; a product
/// absent from the on-shelf listing is off the shelf. Products are kept
/// in their incoming order.
#[must_use]
pub fn merge_inventory(
    products: Vec<Product>,
    on_shelf: &[ProductId],
    stocks: &HashMap<ProductId, u32>,
) -> Vec<ProductRow> {
    products
        .into_iter()
        .map(|product| {
            let stock = stocks.get(&product.id).copied().unwrap_or(0);
            let on_shelf = on_shelf.contains(&product.id);
            ProductRow {
                product,
                stock,
                on_shelf,
            }
        })
        .collect()
}

/// Product form as the admin fills it in.
///
/// `id` is `None` for a new product and set when editing an existing one.
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub id: Option<ProductId>,
    pub brand: String,
    pub model: String,
    pub category: String,
    pub price: Decimal,
    pub gear_system: Option<String>,
    pub frame_size: Option<String>,
    pub color: Option<String>,
    pub image_url: Option<String>,
    pub stock: u32,
    pub on_shelf: bool,
}

impl ProductForm {
    /// Validate the form and produce the product-service payload.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(&self) -> Result<ProductInput, AdminError> {
        for (field, value) in [
            ("brand", &self.brand),
            ("model", &self.model),
            ("category", &self.category),
        ] {
            if value.trim().is_empty() {
                return Err(AdminError::Validation(format!(
                    "{field} must not be empty"
                )));
            }
        }
        if self.price <= Decimal::ZERO {
            return Err(AdminError::Validation(
                "price must be positive".to_string(),
            ));
        }

        Ok(ProductInput {
            id: self.id.clone(),
            brand: self.brand.trim().to_owned(),
            model: self.model.trim().to_owned(),
            category: self.category.trim().to_owned(),
            price: self.price,
            gear_system: self.gear_system.clone(),
            frame_size: self.frame_size.clone(),
            color: self.color.clone(),
            image_url: self.image_url.clone(),
        })
    }

    /// Pre-fill a form from an existing table row for editing.
    #[must_use]
    pub fn from_row(row: &ProductRow) -> Self {
        Self {
            id: Some(row.product.id.clone()),
            brand: row.product.brand.clone(),
            model: row.product.model.clone(),
            category: row.product.category.clone(),
            price: row.product.price,
            gear_system: row.product.gear_system.clone(),
            frame_size: row.product.frame_size.clone(),
            color: row.product.color.clone(),
            image_url: row.product.image_url.clone(),
            stock: row.stock,
            on_shelf: row.on_shelf,
        }
    }
}
