//! Checkout order summary.
//!
//! Totals are derived from the synced cart lines and the backend snapshot.
//! The backend decides discounts and free-shipping eligibility; shipping
//! and tax rules come from [`PricingConfig`].

use forvrmurr_core::Price;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::api::RemoteCart;
use crate::cart::{CartItem, CartState};
use crate::catalog::FALLBACK_PRODUCT_IMAGE;
use crate::config::PricingConfig;

/// Discount code the backend uses to mark free shipping; not shown as a
/// discount line.
pub const FREE_SHIPPING_CODE: &str = "FM-FREESHIPPING";

/// One line of the order summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryLine {
    pub brand: String,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_total: Price,
}

/// A discount shown on the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscountLine {
    pub title: String,
    pub amount: Price,
}

/// The tax row, present only when a tax rate is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxLine {
    /// e.g. `Tax (7.5%)`
    pub label: String,
    pub amount: Price,
}

/// Everything the checkout "Your Order" panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub lines: Vec<SummaryLine>,
    pub subtotal: Price,
    pub discounts: Vec<DiscountLine>,
    pub discount_total: Price,
    pub free_shipping: bool,
    pub shipping: Price,
    pub tax: Option<TaxLine>,
    pub total: Price,
}

impl CheckoutSummary {
    /// Build the summary from cart lines and the snapshot they came from.
    #[must_use]
    pub fn compute(
        items: Option<&[CartItem]>,
        cart: Option<&RemoteCart>,
        pricing: &PricingConfig,
    ) -> Self {
        let money = |amount: Decimal| Price::new(amount, pricing.currency);
        let items = items.unwrap_or_default();

        let lines: Vec<SummaryLine> = items
            .iter()
            .map(|item| SummaryLine {
                brand: item.brand.clone(),
                name: item.name.clone(),
                image_url: item
                    .image_url
                    .clone()
                    .unwrap_or_else(|| FALLBACK_PRODUCT_IMAGE.to_string()),
                quantity: item.quantity,
                unit_price: money(item.price),
                line_total: money(item.line_total()),
            })
            .collect();
        let subtotal = saturating_sum(items.iter().map(CartItem::line_total));

        let discounts: Vec<DiscountLine> = cart
            .map(|c| c.applied_discounts.as_slice())
            .unwrap_or_default()
            .iter()
            .filter(|d| d.title != FREE_SHIPPING_CODE)
            .map(|d| DiscountLine {
                title: d.title.clone(),
                amount: money(d.amount_deducted),
            })
            .collect();
        let discount_total = saturating_sum(discounts.iter().map(|d| d.amount.amount));

        let free_shipping = cart.is_some_and(|c| c.has_free_shipping);
        let shipping = if free_shipping {
            Decimal::ZERO
        } else {
            pricing.shipping_flat_rate
        };

        let taxable = subtotal.saturating_sub(discount_total).max(Decimal::ZERO);
        let tax = pricing.tax_rate.map(|rate| TaxLine {
            label: tax_label(rate),
            amount: money(taxable.saturating_mul(rate).round_dp(2)),
        });
        let tax_amount = tax.as_ref().map_or(Decimal::ZERO, |t| t.amount.amount);
        let total = saturating_sum([taxable, shipping, tax_amount]);

        Self {
            lines,
            subtotal: money(subtotal),
            discounts,
            discount_total: money(discount_total),
            free_shipping,
            shipping: money(shipping),
            tax,
            total: money(total),
        }
    }

    /// Summary of the synchronizer's current state.
    #[must_use]
    pub fn from_state(state: &CartState, pricing: &PricingConfig) -> Self {
        Self::compute(state.items.as_deref(), state.cart.as_ref(), pricing)
    }
}

/// Sum that pins at the decimal bounds instead of panicking.
fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    let mut overflowed = false;
    let total = amounts.into_iter().fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount).unwrap_or_else(|| {
            overflowed = true;
            acc.saturating_add(amount)
        })
    });
    if overflowed {
        warn!(total = %total, "Checkout amount overflowed; saturating");
    }
    total
}

/// `Tax (7.5%)` for a rate of `0.075`.
fn tax_label(rate: Decimal) -> String {
    let percent = (rate * Decimal::ONE_HUNDRED).normalize();
    format!("Tax ({percent}%)")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use forvrmurr_core::{CartLineId, CurrencyCode, ProductId};

    use super::*;
    use crate::api::{AppliedDiscount, RemoteCartItem, RemoteProductRef};
    use crate::cart::items_from_cart;

    fn item(price: i64, quantity: u32) -> CartItem {
        CartItem {
            id: CartLineId::new(format!("line-{price}")),
            name: "Tobacco Vanille".to_string(),
            brand: "Tom".to_string(),
            price: Decimal::from(price),
            image_url: None,
            quantity,
            product_id: ProductId::new("p"),
        }
    }

    fn discount(title: &str, amount: i64) -> AppliedDiscount {
        AppliedDiscount {
            title: title.to_string(),
            amount_deducted: Decimal::from(amount),
        }
    }

    fn pricing(shipping: i64, tax_rate: Option<Decimal>) -> PricingConfig {
        PricingConfig {
            shipping_flat_rate: Decimal::from(shipping),
            tax_rate,
            currency: CurrencyCode::NGN,
        }
    }

    #[test]
    fn test_empty_cart() {
        let summary = CheckoutSummary::compute(None, None, &pricing(0, None));
        assert!(summary.lines.is_empty());
        assert_eq!(summary.subtotal.amount, Decimal::ZERO);
        assert_eq!(summary.total.amount, Decimal::ZERO);
        assert!(summary.tax.is_none());
    }

    #[test]
    fn test_subtotal_shipping_and_total() {
        let items = [item(10000, 2), item(5000, 1)];
        let cart = RemoteCart::default();

        let summary = CheckoutSummary::compute(Some(&items), Some(&cart), &pricing(2500, None));

        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.lines[0].line_total.display(), "₦20,000");
        assert_eq!(summary.lines[0].image_url, FALLBACK_PRODUCT_IMAGE);
        assert_eq!(summary.subtotal.display(), "₦25,000");
        assert!(!summary.free_shipping);
        assert_eq!(summary.shipping.display(), "₦2,500");
        assert_eq!(summary.total.display(), "₦27,500");
    }

    #[test]
    fn test_free_shipping_marker_hidden_and_shipping_waived() {
        let items = [item(10000, 1)];
        let cart = RemoteCart {
            applied_discounts: vec![
                discount(FREE_SHIPPING_CODE, 0),
                discount("WELCOME10", 1000),
            ],
            has_free_shipping: true,
            ..RemoteCart::default()
        };

        let summary = CheckoutSummary::compute(Some(&items), Some(&cart), &pricing(2500, None));

        assert_eq!(summary.discounts.len(), 1);
        assert_eq!(summary.discounts[0].title, "WELCOME10");
        assert_eq!(summary.discount_total.display(), "₦1,000");
        assert!(summary.free_shipping);
        assert_eq!(summary.shipping.amount, Decimal::ZERO);
        assert_eq!(summary.total.display(), "₦9,000");
    }

    #[test]
    fn test_tax_applied_after_discounts() {
        let items = [item(20000, 1)];
        let cart = RemoteCart {
            applied_discounts: vec![discount("VIP", 4000)],
            ..RemoteCart::default()
        };
        let rate = Decimal::new(75, 3);

        let summary =
            CheckoutSummary::compute(Some(&items), Some(&cart), &pricing(1000, Some(rate)));

        let tax = summary.tax.unwrap();
        assert_eq!(tax.label, "Tax (7.5%)");
        assert_eq!(tax.amount.display(), "₦1,200");
        assert_eq!(summary.total.display(), "₦18,200");
    }

    #[test]
    fn test_discount_larger_than_subtotal_floors_taxable() {
        let items = [item(1000, 1)];
        let cart = RemoteCart {
            applied_discounts: vec![discount("OOPS", 5000)],
            ..RemoteCart::default()
        };

        let summary = CheckoutSummary::compute(
            Some(&items),
            Some(&cart),
            &pricing(0, Some(Decimal::new(75, 3))),
        );

        assert_eq!(summary.tax.unwrap().amount.amount, Decimal::ZERO);
        assert_eq!(summary.total.amount, Decimal::ZERO);
    }

    #[test]
    fn test_oversized_server_price_saturates() {
        let cart = RemoteCart {
            items: vec![RemoteCartItem {
                id: CartLineId::new("line-huge"),
                price: "79228162514264337593543950335".to_string(),
                quantity: 2,
                product: RemoteProductRef {
                    id: ProductId::new("p"),
                    name: "Overflow Oud".to_string(),
                    slug: None,
                    image_url: None,
                    image_urls: Vec::new(),
                    brand: None,
                },
            }],
            ..RemoteCart::default()
        };
        let items = items_from_cart(&cart);

        let summary = CheckoutSummary::compute(
            Some(&items),
            Some(&cart),
            &pricing(2500, Some(Decimal::new(75, 3))),
        );

        assert_eq!(summary.lines[0].line_total.amount, Decimal::MAX);
        assert_eq!(summary.subtotal.amount, Decimal::MAX);
        assert_eq!(summary.total.amount, Decimal::MAX);
        assert!(!summary.subtotal.display().is_empty());
    }

    #[test]
    fn test_from_state_uses_synced_lines() {
        let state = CartState {
            items: Some(vec![item(12500, 3)]),
            ..CartState::default()
        };
        let summary = CheckoutSummary::from_state(&state, &PricingConfig::default());
        assert_eq!(summary.subtotal.display(), "₦37,500");
    }
}
