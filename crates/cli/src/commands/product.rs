//! Catalog commands.

use forvrmurr_storefront::api::{HttpCatalogClient, ProductCatalog};
use forvrmurr_storefront::catalog::{ProductCardView, select_notes};
use forvrmurr_storefront::config::StorefrontConfig;
use forvrmurr_storefront::error::Result;

/// Print one product card with a seeded note highlight.
#[allow(clippy::print_stdout)]
pub async fn show(config: &StorefrontConfig, slug: &str, notes: usize, seed: u64) -> Result<()> {
    let catalog = HttpCatalogClient::new(&config.api, config.catalog_cache_ttl)?;
    let product = catalog.get_product(slug).await?;
    let card = ProductCardView::from(&product);

    println!("{} {}", card.brand, card.name);
    println!("{}  [{}]", card.concentration, card.badges().join(", "));
    match &card.full_bottle_price {
        Some(full) => println!("8ml sample {}  (full bottle {full})", card.sample_price),
        None => println!("8ml sample {}", card.sample_price),
    }
    println!("{}", card.href);

    let highlights = select_notes(&product.notes, notes, seed);
    if !highlights.is_empty() {
        let names: Vec<&str> = highlights.iter().map(|n| n.name.as_str()).collect();
        println!("Notes: {}", names.join(", "));
    }
    if let Some(description) = product.description.as_deref() {
        println!();
        println!("{description}");
    }
    Ok(())
}

/// Print one catalog page.
#[allow(clippy::print_stdout)]
pub async fn list(config: &StorefrontConfig, page: u32) -> Result<()> {
    let catalog = HttpCatalogClient::new(&config.api, config.catalog_cache_ttl)?;
    let listing = catalog.list_products(page).await?;

    for product in &listing.items {
        let card = ProductCardView::from(product);
        println!(
            "{:<28} {:<24} {:<10} {}",
            product.slug,
            card.name,
            card.tier.label(),
            card.sample_price
        );
    }
    println!("Page {} ({} products total)", listing.page, listing.total);
    Ok(())
}
