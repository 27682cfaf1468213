//! Status and role enums shared across the storefront and admin surfaces.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Order lifecycle status.
///
/// The gateway is inconsistent about casing: the order service defaults new
/// orders to `active` while other paths emit `ACTIVE`. Deserialization
/// normalizes any casing; serialization and display always use uppercase.
/// Unrecognized values are preserved verbatim in [`OrderStatus::Other`] so
/// the admin panel can still render them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Active,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    /// Whether the order counts as active (cancellable) for cart purposes.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Normalized uppercase wire form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::Cancelled => "CANCELLED",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Other(s) => write!(f, "{}", s.to_uppercase()),
            _ => write!(f, "{}", self.as_str()),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "cancelled" => Self::Cancelled,
            _ => Self::Other(s.to_owned()),
        }
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// User role as stored by the user service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    /// Whether this role may use the admin console.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::User => write!(f, "USER"),
        }
    }
}

/// Display classification for a product's stock count.
///
/// The storefront renders three states: a normal purchasable card above ten
/// units, a low-stock warning from one to ten, and a disabled sold-out card
/// at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockLevel {
    InStock,
    LowStock,
    SoldOut,
}

impl StockLevel {
    /// Classify a unit count.
    #[must_use]
    pub const fn from_units(units: u32) -> Self {
        match units {
            0 => Self::SoldOut,
            1..=10 => Self::LowStock,
            _ => Self::InStock,
        }
    }

    /// Whether the add-to-cart control should be enabled.
    #[must_use]
    pub const fn is_purchasable(self) -> bool {
        !matches!(self, Self::SoldOut)
    }

    /// Label shown on the storefront card.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InStock => "in stock",
            Self::LowStock => "low stock",
            Self::SoldOut => "sold out",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_accepts_both_casings() {
        let upper: OrderStatus = serde_json::from_str("\"ACTIVE\"").expect("upper");
        let lower: OrderStatus = serde_json::from_str("\"active\"").expect("lower");
        let mixed: OrderStatus = serde_json::from_str("\"Cancelled\"").expect("mixed");

        assert_eq!(upper, OrderStatus::Active);
        assert_eq!(lower, OrderStatus::Active);
        assert_eq!(mixed, OrderStatus::Cancelled);
    }

    #[test]
    fn test_order_status_serializes_uppercase() {
        let json = serde_json::to_string(&OrderStatus::Active).expect("serialize");
        assert_eq!(json, "\"ACTIVE\"");
        let json = serde_json::to_string(&OrderStatus::Cancelled).expect("serialize");
        assert_eq!(json, "\"CANCELLED\"");
    }

    #[test]
    fn test_order_status_preserves_unknown_values() {
        let status: OrderStatus = serde_json::from_str("\"refunding\"").expect("other");
        assert_eq!(status, OrderStatus::Other("refunding".to_string()));
        assert!(!status.is_active());
        assert_eq!(status.to_string(), "REFUNDING");
    }

    #[test]
    fn test_role_wire_format() {
        let admin: Role = serde_json::from_str("\"ADMIN\"").expect("admin");
        assert!(admin.is_admin());
        let user: Role = serde_json::from_str("\"USER\"").expect("user");
        assert!(!user.is_admin());
        assert_eq!(serde_json::to_string(&Role::Admin).expect("ser"), "\"ADMIN\"");
    }

    #[test]
    fn test_stock_level_thresholds() {
        assert_eq!(StockLevel::from_units(0), StockLevel::SoldOut);
        assert_eq!(StockLevel::from_units(1), StockLevel::LowStock);
        assert_eq!(StockLevel::from_units(10), StockLevel::LowStock);
        assert_eq!(StockLevel::from_units(11), StockLevel::InStock);
        assert_eq!(StockLevel::from_units(500), StockLevel::InStock);
    }

    #[test]
    fn test_stock_level_purchasable() {
        assert!(StockLevel::InStock.is_purchasable());
        assert!(StockLevel::LowStock.is_purchasable());
        assert!(!StockLevel::SoldOut.is_purchasable());
    }
}
