//! Catalog client and card views against the fake backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use forvrmurr_core::{NoteId, ProductTier, ScentNote, ScentNotes};
use forvrmurr_integration_tests::{PAGE_SIZE, TestBackend, product};
use forvrmurr_storefront::api::{ApiError, HttpCatalogClient, ProductCatalog};
use forvrmurr_storefront::catalog::{ProductCardView, select_notes};

fn note(id: &str) -> ScentNote {
    ScentNote {
        id: NoteId::new(id),
        name: id.to_string(),
        image_url: None,
    }
}

async fn backend() -> TestBackend {
    let backend = TestBackend::spawn().await;
    let mut grand_soir = product("prod-a", "grand-soir", "12500.00");
    grand_soir.tier = ProductTier::Premium;
    grand_soir.is_best_seller = true;
    grand_soir.notes = ScentNotes {
        top_notes: vec![note("Amber"), note("Labdanum"), note("Tonka")],
        middle_notes: vec![note("Benzoin"), note("Cistus")],
        base_notes: vec![note("Vanilla"), note("Musk")],
    };
    backend.add_product(grand_soir);
    backend.add_product(product("prod-b", "baccarat-rouge", "18000.00"));
    backend.add_product(product("prod-c", "oud-wood", "15000.00"));
    backend
}

fn catalog(backend: &TestBackend) -> HttpCatalogClient {
    HttpCatalogClient::new(&backend.api_config(), Duration::from_secs(60)).unwrap()
}

#[tokio::test]
async fn test_product_responses_are_cached() {
    let backend = backend().await;
    let catalog = catalog(&backend);

    let first = catalog.get_product("grand-soir").await.unwrap();
    let second = catalog.get_product("grand-soir").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(backend.hits("GET /products/{slug}"), 1);

    catalog.invalidate_all();
    catalog.get_product("grand-soir").await.unwrap();
    assert_eq!(backend.hits("GET /products/{slug}"), 2);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let backend = backend().await;
    let err = catalog(&backend).get_product("nope").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_pages_are_cached_per_page() {
    let backend = backend().await;
    let catalog = catalog(&backend);

    let first = catalog.list_products(1).await.unwrap();
    assert_eq!(first.items.len(), PAGE_SIZE);
    assert_eq!(first.total, 3);

    // Page 0 is treated as page 1 and served from cache
    let zero = catalog.list_products(0).await.unwrap();
    assert_eq!(zero, first);
    assert_eq!(backend.hits("GET /products"), 1);

    let second = catalog.list_products(2).await.unwrap();
    assert_eq!(second.page, 2);
    assert_eq!(second.items[0].slug, "oud-wood");
    assert_eq!(backend.hits("GET /products"), 2);
}

#[tokio::test]
async fn test_card_and_note_highlights_from_fetched_product() {
    let backend = backend().await;
    let product = catalog(&backend).get_product("grand-soir").await.unwrap();

    let card = ProductCardView::from(&product);
    assert_eq!(card.href, "/shop/grand-soir");
    assert_eq!(card.sample_price, "₦12,500");
    assert_eq!(card.badges(), vec!["Premium", "Bestseller"]);
    assert_eq!(card.preview_notes.len(), 5);

    let highlights = select_notes(&product.notes, 3, 11);
    assert_eq!(highlights.len(), 3);
    assert_eq!(highlights, select_notes(&product.notes, 3, 11));
}
