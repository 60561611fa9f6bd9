//! Wire types for the storefront backend API.
//!
//! Field names follow the backend's camelCase JSON. Optional collections
//! default to empty so older backend builds that omit them still parse.

use forvrmurr_core::{CartLineId, GuestToken, ProductId, ProductTier, ScentNotes};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Cart Types
// =============================================================================

/// The authoritative cart snapshot returned by every cart endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCart {
    /// Backend cart ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Line items, in backend order.
    #[serde(default)]
    pub items: Vec<RemoteCartItem>,
    /// Discounts the backend applied.
    #[serde(default)]
    pub applied_discounts: Vec<AppliedDiscount>,
    /// Whether the cart currently ships free.
    #[serde(default)]
    pub has_free_shipping: bool,
    /// Guest-session token, present on unauthenticated responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<GuestToken>,
}

/// One line item in a remote cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartItem {
    /// Line item ID (not the product ID).
    pub id: CartLineId,
    /// Unit price as a decimal string (preserves precision).
    pub price: String,
    /// Quantity.
    pub quantity: i64,
    /// The product this line refers to.
    pub product: RemoteProductRef,
}

/// Product summary embedded in a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProductRef {
    /// Product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// URL slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Primary image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Gallery image URLs.
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Fragrance house.
    #[serde(default)]
    pub brand: Option<BrandRef>,
}

/// Fragrance house reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandRef {
    /// Brand name.
    pub name: String,
}

/// A discount applied to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDiscount {
    /// Discount title or code.
    pub title: String,
    /// Amount deducted from the order.
    pub amount_deducted: Decimal,
}

/// Input for adding a product to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Product to add.
    pub product_id: ProductId,
    /// How many.
    pub quantity: u32,
}

impl CartLineInput {
    /// Create an add-to-cart input.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Body for a quantity update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityUpdate {
    /// New quantity.
    pub quantity: u32,
}

// =============================================================================
// Catalog Types
// =============================================================================

/// A fragrance as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Fragrance name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Fragrance house.
    #[serde(default)]
    pub brand: Option<BrandRef>,
    /// Sample tier.
    #[serde(default, rename = "type")]
    pub tier: ProductTier,
    /// Best-seller flag.
    #[serde(default)]
    pub is_best_seller: bool,
    /// Concentration (e.g. "EXTRAIT DE PARFUM").
    #[serde(default)]
    pub concentration: Option<String>,
    /// Sample (8ml) price in naira, decimal string.
    pub naira_price: String,
    /// Full-bottle reference price in USD, decimal string.
    #[serde(default)]
    pub price_full_bottle: Option<String>,
    /// Gallery image URLs; the first is the card image.
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Note pyramid.
    #[serde(flatten)]
    pub notes: ScentNotes,
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    /// Products on this page.
    #[serde(default)]
    pub items: Vec<Product>,
    /// Total products across all pages.
    #[serde(default)]
    pub total: u64,
    /// 1-based page number.
    #[serde(default = "first_page")]
    pub page: u32,
}

const fn first_page() -> u32 {
    1
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_cart_minimal_payload() {
        let cart: RemoteCart = serde_json::from_str(r#"{"items":[]}"#).unwrap();
        assert!(cart.items.is_empty());
        assert!(cart.applied_discounts.is_empty());
        assert!(!cart.has_free_shipping);
        assert!(cart.guest_id.is_none());
    }

    #[test]
    fn test_remote_cart_full_payload() {
        let json = r#"{
            "id": "cart-1",
            "items": [{
                "id": "line-1",
                "price": "10000.00",
                "quantity": 2,
                "product": {
                    "id": "prod-a",
                    "name": "Delina Exclusif",
                    "slug": "delina-exclusif",
                    "imageUrl": null,
                    "brand": {"name": "Parfums de Marly"}
                }
            }],
            "appliedDiscounts": [{"title": "WELCOME10", "amountDeducted": 1500}],
            "hasFreeShipping": true,
            "guestId": "g1"
        }"#;
        let cart: RemoteCart = serde_json::from_str(json).unwrap();

        assert_eq!(cart.items.len(), 1);
        let item = &cart.items[0];
        assert_eq!(item.id.as_str(), "line-1");
        assert_eq!(item.product.id.as_str(), "prod-a");
        assert!(item.product.image_urls.is_empty());
        assert_eq!(cart.applied_discounts[0].amount_deducted, Decimal::from(1500));
        assert!(cart.has_free_shipping);
        assert_eq!(cart.guest_id.unwrap().as_str(), "g1");
    }

    #[test]
    fn test_discount_amount_accepts_string() {
        let discount: AppliedDiscount =
            serde_json::from_str(r#"{"title":"X","amountDeducted":"250.50"}"#).unwrap();
        assert_eq!(discount.amount_deducted, Decimal::new(25050, 2));
    }

    #[test]
    fn test_cart_line_input_is_camel_case() {
        let input = CartLineInput::new("prod-a", 1);
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["productId"], "prod-a");
        assert_eq!(json["quantity"], 1);
    }

    #[test]
    fn test_product_flattens_notes() {
        let json = r#"{
            "id": "p1",
            "name": "Oud Satin Mood",
            "slug": "oud-satin-mood",
            "type": "premium",
            "isBestSeller": true,
            "nairaPrice": "25000",
            "topNotes": [{"id": "n1", "name": "Violet"}],
            "baseNotes": [{"id": "n2", "name": "Oud"}]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.tier, ProductTier::Premium);
        assert!(product.is_best_seller);
        assert_eq!(product.notes.top_notes.len(), 1);
        assert!(product.notes.middle_notes.is_empty());
        assert_eq!(product.notes.base_notes[0].name, "Oud");
    }

    #[test]
    fn test_product_page_defaults() {
        let page: ProductPage = serde_json::from_str(r#"{"items":[]}"#).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.total, 0);
    }
}
