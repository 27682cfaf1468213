//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.
//!
//! The gateway identifies entities with opaque strings: products and orders
//! use UUID strings, users additionally carry a client-generated
//! `user-<millis>-<n>` identifier. The wrappers deliberately do not parse or
//! validate the contents.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use spokeshop_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new("123e4567-e89b-12d3-a456-426614174000");
/// let order_id = OrderId::new("f0e9d8c7-b6a5-4321-fedc-ba9876543210");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(UserId);
define_id!(OrderId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        let id = ProductId::new("a1b2c3d4-e5f6-7890-1234-567890abcdef");
        assert_eq!(id.as_str(), "a1b2c3d4-e5f6-7890-1234-567890abcdef");
        assert_eq!(id.to_string(), "a1b2c3d4-e5f6-7890-1234-567890abcdef");
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = OrderId::new("f0e9d8c7-b6a5-4321-fedc-ba9876543210");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"f0e9d8c7-b6a5-4321-fedc-ba9876543210\"");

        let back: OrderId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_as_json_map_key() {
        // The inventory stocks endpoint returns a JSON object keyed by
        // product id, so the wrapper must deserialize from a map key.
        let json = r#"{"a1": 5, "b2": 0}"#;
        let map: std::collections::HashMap<ProductId, u32> =
            serde_json::from_str(json).expect("deserialize map");
        assert_eq!(map.get(&ProductId::new("a1")), Some(&5));
        assert_eq!(map.get(&ProductId::new("b2")), Some(&0));
    }
}
