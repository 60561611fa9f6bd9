//! Cart commands.

use std::process::ExitCode;

use forvrmurr_core::{CartLineId, Price};
use forvrmurr_storefront::api::CartLineInput;
use forvrmurr_storefront::cart::{CartState, SyncOutcome};
use forvrmurr_storefront::checkout::CheckoutSummary;
use forvrmurr_storefront::config::PricingConfig;

use super::Session;

pub async fn show(session: &Session) -> ExitCode {
    let outcome = session.sync.load().await;
    print_cart(&session.sync.snapshot());
    exit_code(outcome)
}

pub async fn add(session: &Session, product_id: &str, quantity: u32) -> ExitCode {
    session.sync.load().await;
    let outcome = session
        .sync
        .add_item(CartLineInput::new(product_id, quantity))
        .await;
    print_cart(&session.sync.snapshot());
    exit_code(outcome)
}

pub async fn remove(session: &Session, line_id: &str) -> ExitCode {
    session.sync.load().await;
    let outcome = session.sync.remove_item(&CartLineId::new(line_id)).await;
    print_cart(&session.sync.snapshot());
    exit_code(outcome)
}

pub async fn update(session: &Session, line_id: &str, quantity: i64) -> ExitCode {
    session.sync.load().await;
    let outcome = session
        .sync
        .update_quantity(&CartLineId::new(line_id), quantity)
        .await;
    if outcome == SyncOutcome::Skipped {
        super::print_error("quantity must be at least 1");
        return ExitCode::FAILURE;
    }
    print_cart(&session.sync.snapshot());
    exit_code(outcome)
}

pub async fn clear(session: &Session) -> ExitCode {
    session.sync.load().await;
    let outcome = session.sync.clear().await;
    print_cart(&session.sync.snapshot());
    exit_code(outcome)
}

pub async fn summary(session: &Session, pricing: &PricingConfig) -> ExitCode {
    let outcome = session.sync.load().await;
    print_summary(&CheckoutSummary::from_state(
        &session.sync.snapshot(),
        pricing,
    ));
    exit_code(outcome)
}

fn exit_code(outcome: SyncOutcome) -> ExitCode {
    if outcome == SyncOutcome::Failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[allow(clippy::print_stdout)]
fn print_cart(state: &CartState) {
    let Some(items) = state.items.as_deref() else {
        println!("No cart yet.");
        return;
    };
    if items.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for item in items {
        println!(
            "{:<26} {:<12} {:<28} x{:<3} {}",
            item.id.as_str(),
            item.brand,
            item.name,
            item.quantity,
            Price::naira(item.line_total()).display(),
        );
    }
    println!("{} item(s)", state.item_count());
}

#[allow(clippy::print_stdout)]
fn print_summary(summary: &CheckoutSummary) {
    if summary.lines.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in &summary.lines {
        println!(
            "{} {} x{}  {}",
            line.brand,
            line.name,
            line.quantity,
            line.line_total.display()
        );
    }
    println!("Subtotal  {}", summary.subtotal.display());
    for discount in &summary.discounts {
        println!("{}  -{}", discount.title, discount.amount.display());
    }
    if summary.free_shipping {
        println!("Shipping  Free");
    } else {
        println!("Shipping  {}", summary.shipping.display());
    }
    if let Some(tax) = &summary.tax {
        println!("{}  {}", tax.label, tax.amount.display());
    }
    println!("Total  {}", summary.total.display());
}
