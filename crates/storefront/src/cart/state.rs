//! Observable cart state.

use chrono::{DateTime, Utc};
use forvrmurr_core::GuestToken;
use serde::Serialize;

use super::view::CartItem;
use crate::api::RemoteCart;

/// Everything a consumer can see about the cart.
///
/// Cloned out of the synchronizer on every read; never mutated by consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartState {
    /// Line items, or `None` before the first successful sync.
    pub items: Option<Vec<CartItem>>,
    /// Last applied remote snapshot.
    pub cart: Option<RemoteCart>,
    /// Whether the cart drawer is open.
    pub is_open: bool,
    /// Operations started but not yet finished.
    pub in_flight: u32,
    /// Guest token currently held.
    pub guest_token: Option<GuestToken>,
    /// Ticket of the newest completion applied so far.
    pub applied_seq: u64,
    /// When a remote snapshot was last applied.
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl CartState {
    /// Whether any cart operation is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Whether a sync has populated the items.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.items.is_some()
    }

    /// Sum of quantities across all lines (0 when not loaded).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use forvrmurr_core::{CartLineId, ProductId};
    use rust_decimal::Decimal;

    use super::*;

    fn item(id: &str, quantity: u32) -> CartItem {
        CartItem {
            id: CartLineId::new(id),
            name: "Hacivat".to_string(),
            brand: "Nishane".to_string(),
            price: Decimal::new(12500, 0),
            image_url: None,
            quantity,
            product_id: ProductId::new("prod-h"),
        }
    }

    #[test]
    fn test_default_state_is_unloaded() {
        let state = CartState::default();
        assert!(!state.is_loaded());
        assert!(!state.is_loading());
        assert!(!state.is_open);
        assert_eq!(state.item_count(), 0);
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let state = CartState {
            items: Some(vec![item("a", 2), item("b", 3)]),
            ..CartState::default()
        };
        assert_eq!(state.item_count(), 5);
    }

    #[test]
    fn test_is_loading_tracks_counter() {
        let state = CartState {
            in_flight: 2,
            ..CartState::default()
        };
        assert!(state.is_loading());
    }
}
