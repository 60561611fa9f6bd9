//! Product card view model.

use std::str::FromStr;

use forvrmurr_core::{CurrencyCode, NoteCategory, Price, ProductTier, ScentNote};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::api::Product;

/// Card image when a product has none.
pub const FALLBACK_PRODUCT_IMAGE: &str = "/images/hero/hero_image.png";

/// Note icon when a note has none.
pub const FALLBACK_NOTE_IMAGE: &str = "/images/scent_notes/default.png";

/// Concentration shown when the backend leaves it blank.
pub const DEFAULT_CONCENTRATION: &str = "EAU DE PARFUM";

/// How many notes of each tier the card previews.
const PREVIEW_NOTES: [(NoteCategory, usize); 3] = [
    (NoteCategory::Top, 2),
    (NoteCategory::Middle, 2),
    (NoteCategory::Base, 1),
];

/// A note as shown on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotePreview {
    pub category: NoteCategory,
    pub name: String,
    pub image_url: String,
}

impl NotePreview {
    /// Preview for one note, falling back to the default icon.
    #[must_use]
    pub fn new(category: NoteCategory, note: &ScentNote) -> Self {
        Self {
            category,
            name: note.name.clone(),
            image_url: note
                .image_url
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| FALLBACK_NOTE_IMAGE.to_string()),
        }
    }
}

/// Everything a product card renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCardView {
    /// Detail page link, `/shop/{slug}`.
    pub href: String,
    pub brand: String,
    pub name: String,
    pub concentration: String,
    /// 8ml sample price, whole naira (`₦12,500`).
    pub sample_price: String,
    /// Full-bottle reference price in USD, when known.
    pub full_bottle_price: Option<String>,
    pub tier: ProductTier,
    pub is_best_seller: bool,
    pub image_url: String,
    pub preview_notes: Vec<NotePreview>,
}

impl ProductCardView {
    /// Badge labels in display order.
    #[must_use]
    pub fn badges(&self) -> Vec<&'static str> {
        let mut badges = vec![self.tier.label()];
        if self.is_best_seller {
            badges.push("Bestseller");
        }
        badges
    }
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        let preview_notes = PREVIEW_NOTES
            .iter()
            .flat_map(|(category, count)| {
                product
                    .notes
                    .category(*category)
                    .iter()
                    .take(*count)
                    .map(|note| NotePreview::new(*category, note))
            })
            .collect();

        Self {
            href: format!("/shop/{}", product.slug),
            brand: product
                .brand
                .as_ref()
                .map(|b| b.name.clone())
                .unwrap_or_default(),
            name: product.name.clone(),
            concentration: product
                .concentration
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(DEFAULT_CONCENTRATION)
                .to_string(),
            sample_price: Price::new(parse_amount(&product.naira_price), CurrencyCode::NGN)
                .display_whole(),
            full_bottle_price: product
                .price_full_bottle
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .map(|p| Price::new(parse_amount(p), CurrencyCode::USD).display_whole()),
            tier: product.tier,
            is_best_seller: product.is_best_seller,
            image_url: product
                .image_urls
                .first()
                .filter(|url| !url.is_empty())
                .cloned()
                .unwrap_or_else(|| FALLBACK_PRODUCT_IMAGE.to_string()),
            preview_notes,
        }
    }
}

fn parse_amount(raw: &str) -> Decimal {
    Decimal::from_str(raw.trim()).unwrap_or_else(|e| {
        warn!(price = raw, error = %e, "Unparseable product price");
        Decimal::ZERO
    })
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use forvrmurr_core::{NoteId, ProductId, ScentNotes};

    use super::*;
    use crate::api::BrandRef;

    fn note(id: &str, image_url: Option<&str>) -> ScentNote {
        ScentNote {
            id: NoteId::new(id),
            name: id.to_string(),
            image_url: image_url.map(String::from),
        }
    }

    fn product() -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Grand Soir".to_string(),
            slug: "grand-soir".to_string(),
            brand: Some(BrandRef {
                name: "Maison Francis Kurkdjian".to_string(),
            }),
            tier: ProductTier::Premium,
            is_best_seller: false,
            concentration: None,
            naira_price: "12500.75".to_string(),
            price_full_bottle: Some("245".to_string()),
            image_urls: Vec::new(),
            description: None,
            notes: ScentNotes {
                top_notes: vec![
                    note("Amber", Some("/n/amber.png")),
                    note("Labdanum", None),
                    note("Tonka", None),
                ],
                middle_notes: vec![note("Benzoin", None)],
                base_notes: vec![note("Vanilla", None), note("Cistus", None)],
            },
        }
    }

    #[test]
    fn test_card_basics() {
        let card = ProductCardView::from(&product());

        assert_eq!(card.href, "/shop/grand-soir");
        assert_eq!(card.brand, "Maison Francis Kurkdjian");
        assert_eq!(card.concentration, DEFAULT_CONCENTRATION);
        assert_eq!(card.sample_price, "₦12,500");
        assert_eq!(card.full_bottle_price.as_deref(), Some("$245"));
        assert_eq!(card.image_url, FALLBACK_PRODUCT_IMAGE);
        assert_eq!(card.badges(), vec!["Premium"]);
    }

    #[test]
    fn test_preview_notes_take_two_two_one() {
        let card = ProductCardView::from(&product());
        let names: Vec<_> = card.preview_notes.iter().map(|n| n.name.as_str()).collect();

        assert_eq!(names, vec!["Amber", "Labdanum", "Benzoin", "Vanilla"]);
        assert_eq!(card.preview_notes[0].image_url, "/n/amber.png");
        assert_eq!(card.preview_notes[1].image_url, FALLBACK_NOTE_IMAGE);
        assert_eq!(card.preview_notes[3].category, NoteCategory::Base);
    }

    #[test]
    fn test_bestseller_and_gallery_image() {
        let mut p = product();
        p.is_best_seller = true;
        p.tier = ProductTier::Prime;
        p.concentration = Some("Extrait de Parfum".to_string());
        p.image_urls = vec!["https://cdn.test/grand-soir.png".to_string()];
        p.price_full_bottle = None;

        let card = ProductCardView::from(&p);

        assert_eq!(card.badges(), vec!["Prime", "Bestseller"]);
        assert_eq!(card.concentration, "Extrait de Parfum");
        assert_eq!(card.image_url, "https://cdn.test/grand-soir.png");
        assert_eq!(card.full_bottle_price, None);
    }

    #[test]
    fn test_missing_brand_is_blank() {
        let mut p = product();
        p.brand = None;
        assert_eq!(ProductCardView::from(&p).brand, "");
    }
}
