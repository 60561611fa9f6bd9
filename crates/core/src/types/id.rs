//! Newtype IDs for type-safe entity references.
//!
//! The storefront backend hands out opaque string identifiers. Use the
//! `define_id!` macro to create wrappers that prevent accidentally mixing
//! a cart line ID with the product it points at.

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use forvrmurr_core::define_id;
/// define_id!(ProductId);
/// define_id!(CartLineId);
///
/// let product_id = ProductId::new("p-1");
/// let line_id = CartLineId::new("p-1");
///
/// // These are different types, so this won't compile:
/// // let _: ProductId = line_id;
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

            /// Borrow the underlying identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the identifier.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(CartLineId);
define_id!(CustomerId);
define_id!(NoteId);

/// Opaque guest-session identifier issued by the backend.
///
/// Tracks an unauthenticated shopper's cart across requests. `Debug` only
/// shows a short prefix so tokens don't end up whole in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestToken(String);

impl GuestToken {
    /// Wrap a token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token for sending to the backend or persisting.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for GuestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.chars().take(4).collect();
        write!(f, "GuestToken({prefix}…)")
    }
}

impl From<String> for GuestToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for GuestToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_as_str() {
        let id = ProductId::new("prod_123");
        assert_eq!(id.as_str(), "prod_123");
        assert_eq!(id.to_string(), "prod_123");
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = CartLineId::new("line-9");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"line-9\"");

        let parsed: CartLineId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_guest_token_debug_is_truncated() {
        let token = GuestToken::new("abcdef-123456");
        let debug = format!("{token:?}");
        assert!(debug.starts_with("GuestToken(abcd"));
        assert!(!debug.contains("123456"));
    }

    #[test]
    fn test_guest_token_roundtrips_as_plain_string() {
        let token: GuestToken = serde_json::from_str("\"g1\"").unwrap();
        assert_eq!(token.as_str(), "g1");
    }
}
