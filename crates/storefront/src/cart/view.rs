//! Local cart line view model, re-derived from every remote snapshot.

use std::str::FromStr;

use forvrmurr_core::{CartLineId, ProductId};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::api::{RemoteCart, RemoteCartItem, RemoteProductRef};

/// One cart line as the shopper sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    /// Remote line item ID (not the product ID).
    pub id: CartLineId,
    /// Fragrance name.
    pub name: String,
    /// Brand label.
    pub brand: String,
    /// Unit price.
    pub price: Decimal,
    /// Image to show, if any.
    pub image_url: Option<String>,
    /// Quantity.
    pub quantity: u32,
    /// The product this line refers to.
    pub product_id: ProductId,
}

impl CartItem {
    /// `price * quantity`, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or_else(|| {
                warn!(
                    line_id = %self.id,
                    price = %self.price,
                    quantity = self.quantity,
                    "Cart line total overflowed"
                );
                if self.price.is_sign_negative() {
                    Decimal::MIN
                } else {
                    Decimal::MAX
                }
            })
    }
}

// =============================================================================
// Type Conversions
// =============================================================================

/// Map every line of a snapshot, preserving order.
#[must_use]
pub fn items_from_cart(cart: &RemoteCart) -> Vec<CartItem> {
    cart.items.iter().map(CartItem::from).collect()
}

impl From<&RemoteCartItem> for CartItem {
    fn from(item: &RemoteCartItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.product.name.clone(),
            brand: brand_label(&item.product),
            price: parse_price(&item.id, &item.price),
            image_url: image_url(&item.product),
            quantity: clamp_quantity(&item.id, item.quantity),
            product_id: item.product.id.clone(),
        }
    }
}

fn parse_price(line: &CartLineId, raw: &str) -> Decimal {
    Decimal::from_str(raw.trim()).unwrap_or_else(|e| {
        warn!(line_id = %line, price = raw, error = %e, "Unparseable cart line price");
        Decimal::ZERO
    })
}

fn clamp_quantity(line: &CartLineId, quantity: i64) -> u32 {
    u32::try_from(quantity).unwrap_or_else(|_| {
        warn!(line_id = %line, quantity, "Cart line quantity out of range");
        if quantity < 0 { 0 } else { u32::MAX }
    })
}

/// Brand name, else the first word of the product name, else empty.
fn brand_label(product: &RemoteProductRef) -> String {
    product
        .brand
        .as_ref()
        .map(|b| b.name.trim())
        .filter(|name| !name.is_empty())
        .or_else(|| product.name.split_whitespace().next())
        .unwrap_or_default()
        .to_string()
}

/// `imageUrl`, then the first `imageUrls` entry, then the slug's catalog image.
fn image_url(product: &RemoteProductRef) -> Option<String> {
    product
        .image_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .or_else(|| {
            product
                .image_urls
                .iter()
                .map(String::as_str)
                .find(|url| !url.is_empty())
        })
        .map(String::from)
        .or_else(|| {
            product
                .slug
                .as_deref()
                .filter(|slug| !slug.is_empty())
                .map(|slug| format!("/images/products/{slug}.png"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BrandRef;

    fn product() -> RemoteProductRef {
        RemoteProductRef {
            id: ProductId::new("prod-a"),
            name: "Baccarat Rouge 540".to_string(),
            slug: Some("baccarat-rouge-540".to_string()),
            image_url: None,
            image_urls: Vec::new(),
            brand: None,
        }
    }

    fn line(price: &str, quantity: i64, product: RemoteProductRef) -> RemoteCartItem {
        RemoteCartItem {
            id: CartLineId::new("line-1"),
            price: price.to_string(),
            quantity,
            product,
        }
    }

    #[test]
    fn test_item_identity_is_line_id() {
        let item = CartItem::from(&line("10000.00", 1, product()));
        assert_eq!(item.id.as_str(), "line-1");
        assert_eq!(item.product_id.as_str(), "prod-a");
    }

    #[test]
    fn test_price_parsed_from_decimal_string() {
        let item = CartItem::from(&line("10000.00", 2, product()));
        assert_eq!(item.price, Decimal::new(10000, 0));
        assert_eq!(item.line_total(), Decimal::new(20000, 0));
    }

    #[test]
    fn test_line_total_saturates_on_overflow() {
        let item = CartItem::from(&line("79228162514264337593543950335", 2, product()));
        assert_eq!(item.price, Decimal::MAX);
        assert_eq!(item.line_total(), Decimal::MAX);
    }

    #[test]
    fn test_unparseable_price_is_zero() {
        let item = CartItem::from(&line("ten thousand", 1, product()));
        assert_eq!(item.price, Decimal::ZERO);
    }

    #[test]
    fn test_negative_quantity_clamped() {
        let item = CartItem::from(&line("1", -4, product()));
        assert_eq!(item.quantity, 0);
    }

    #[test]
    fn test_brand_priority() {
        let mut p = product();
        p.brand = Some(BrandRef {
            name: "Maison Francis Kurkdjian".to_string(),
        });
        assert_eq!(brand_label(&p), "Maison Francis Kurkdjian");

        p.brand = None;
        assert_eq!(brand_label(&p), "Baccarat");

        p.name = "   ".to_string();
        assert_eq!(brand_label(&p), "");
    }

    #[test]
    fn test_image_priority() {
        let mut p = product();
        assert_eq!(
            image_url(&p).as_deref(),
            Some("/images/products/baccarat-rouge-540.png")
        );

        p.image_urls = vec!["https://cdn.test/gallery-1.png".to_string()];
        assert_eq!(
            image_url(&p).as_deref(),
            Some("https://cdn.test/gallery-1.png")
        );

        p.image_url = Some("https://cdn.test/primary.png".to_string());
        assert_eq!(image_url(&p).as_deref(), Some("https://cdn.test/primary.png"));

        let bare = RemoteProductRef {
            slug: None,
            ..product()
        };
        assert_eq!(image_url(&bare), None);
    }

    #[test]
    fn test_items_from_cart_preserves_order() {
        let mut second = line("5", 1, product());
        second.id = CartLineId::new("line-2");
        let cart = RemoteCart {
            items: vec![line("1", 1, product()), second],
            ..RemoteCart::default()
        };

        let ids: Vec<_> = items_from_cart(&cart)
            .into_iter()
            .map(|i| i.id.into_inner())
            .collect();
        assert_eq!(ids, vec!["line-1", "line-2"]);
    }
}
