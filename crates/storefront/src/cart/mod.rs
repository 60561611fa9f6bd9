//! Cart state synchronizer.
//!
//! Keeps a local, eventually-consistent mirror of the backend-owned cart.
//!
//! # Architecture
//!
//! - The backend is authoritative. Every successful call returns the full
//!   cart snapshot, and local line items are re-derived from it.
//! - Mutations are pessimistic: nothing changes locally until the backend
//!   answers, so a failed call has nothing to roll back.
//! - Each network operation takes a ticket before it suspends. A completion
//!   is applied only if its ticket is newer than the last one applied, so
//!   out-of-order responses can't overwrite fresher state.
//! - Guest shoppers are tracked by a backend-issued token kept in client
//!   storage. It is only sent while nobody is signed in, and is dropped once
//!   the signed-in cart has been fetched. Guest carts are not merged.
//!
//! # Example
//!
//! ```rust,ignore
//! let cart = CartSynchronizer::new(client, storage, identity, Arc::new(TracingSink));
//! cart.load().await;
//! cart.add_item(CartLineInput::new(product_id, 1)).await;
//! assert!(cart.snapshot().is_open);
//! ```

mod state;
mod view;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use forvrmurr_core::{CartLineId, GuestToken};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::api::{ApiError, CartApi, CartLineInput, RemoteCart};
use crate::error::add_breadcrumb;
use crate::identity::IdentityProvider;
use crate::notify::ErrorSink;
use crate::storage::{ClientStorage, keys};

pub use state::CartState;
pub use view::{CartItem, items_from_cart};

/// Messages shown to the shopper when a cart mutation fails.
pub mod messages {
    pub const ADD_FAILED: &str = "Could not add item to cart. Please try again.";
    pub const REMOVE_FAILED: &str = "Could not remove item from cart. Please try again.";
    pub const UPDATE_FAILED: &str = "Could not update quantity. Please try again.";
    pub const CLEAR_FAILED: &str = "Could not clear cart. Please try again.";
}

/// What an operation did to the local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The backend answered and the response was applied.
    Applied,
    /// The backend answered, but a newer response had already been applied.
    Stale,
    /// Nothing was sent (invalid input, or nothing to fetch).
    Skipped,
    /// The backend call failed.
    Failed,
}

// =============================================================================
// CartSynchronizer
// =============================================================================

/// Owner of the local cart mirror.
///
/// Construct one per shopper session and share it by reference (or `Arc`).
/// Consumers read through [`snapshot`](Self::snapshot) or
/// [`subscribe`](Self::subscribe); only the synchronizer writes.
pub struct CartSynchronizer<A> {
    api: A,
    storage: Arc<dyn ClientStorage>,
    identity: Arc<dyn IdentityProvider>,
    sink: Arc<dyn ErrorSink>,
    state: watch::Sender<CartState>,
    last_ticket: AtomicU64,
}

impl<A> std::fmt::Debug for CartSynchronizer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSynchronizer")
            .field("state", &*self.state.borrow())
            .field("last_ticket", &self.last_ticket.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<A: CartApi> CartSynchronizer<A> {
    /// Create a synchronizer, picking up any guest token left in storage.
    ///
    /// Nothing is fetched until [`load`](Self::load) is called.
    pub fn new(
        api: A,
        storage: Arc<dyn ClientStorage>,
        identity: Arc<dyn IdentityProvider>,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        let guest_token = match storage.get(keys::GUEST_ID) {
            Ok(token) => token.filter(|t| !t.is_empty()).map(GuestToken::new),
            Err(e) => {
                warn!(error = %e, "Failed to read guest token from storage");
                None
            }
        };

        let (state, _) = watch::channel(CartState {
            guest_token,
            ..CartState::default()
        });

        Self {
            api,
            storage,
            identity,
            sink,
            state,
            last_ticket: AtomicU64::new(0),
        }
    }

    /// The underlying API client.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Fetch the cart for the current identity.
    ///
    /// Signed-in shoppers get their account cart, guests with a token get
    /// the guest cart, and anyone else gets an empty, unloaded cart without
    /// a network call. On failure the local cache is dropped.
    #[instrument(skip(self))]
    pub async fn load(&self) -> SyncOutcome {
        self.fetch(true).await
    }

    /// Same as [`load`](Self::load), but a failure keeps the cached cart.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> SyncOutcome {
        self.fetch(false).await
    }

    async fn fetch(&self, clear_on_failure: bool) -> SyncOutcome {
        let ticket = self.begin();
        let authenticated = self.identity.is_authenticated();

        let result = if authenticated {
            self.api.get_cart().await
        } else if let Some(guest) = self.held_guest_token() {
            self.api.get_guest_cart(&guest).await
        } else {
            debug!("No customer or guest token; cart is empty");
            self.settle(ticket, |s| {
                s.items = None;
                s.cart = None;
            });
            return SyncOutcome::Skipped;
        };

        match result {
            Ok(cart) => {
                if authenticated {
                    self.discard_guest_token();
                }
                self.apply(ticket, cart, |_| {})
            }
            Err(e) if clear_on_failure => {
                warn!(error = %e, "Failed to load cart");
                self.settle(ticket, |s| {
                    s.items = None;
                    s.cart = None;
                });
                SyncOutcome::Failed
            }
            Err(e) => {
                warn!(error = %e, "Failed to refresh cart, keeping cached state");
                self.finish();
                SyncOutcome::Failed
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a product and open the cart.
    ///
    /// If the first attempt fails, stored credentials and the guest token
    /// are cleared and the call is retried once without a token so the
    /// backend starts a fresh guest session.
    #[instrument(skip(self, line), fields(product_id = %line.product_id, quantity = line.quantity))]
    pub async fn add_item(&self, line: CartLineInput) -> SyncOutcome {
        let ticket = self.begin();
        let guest = self.outgoing_guest_token();

        let result = match self.api.add_item(&line, guest.as_ref()).await {
            Ok(cart) => Ok(cart),
            Err(e) => {
                warn!(error = %e, "Add to cart failed, retrying with a fresh session");
                self.discard_credentials();
                self.api.add_item(&line, None).await
            }
        };

        match result {
            Ok(cart) => {
                add_breadcrumb(
                    "cart",
                    "Added item",
                    Some(&[("product_id", line.product_id.as_str())]),
                );
                self.apply(ticket, cart, |s| s.is_open = true)
            }
            Err(e) => self.fail(&e, messages::ADD_FAILED),
        }
    }

    /// Remove a line item.
    #[instrument(skip(self, item_id), fields(item_id = %item_id))]
    pub async fn remove_item(&self, item_id: &CartLineId) -> SyncOutcome {
        let ticket = self.begin();
        let guest = self.outgoing_guest_token();

        match self.api.remove_item(item_id, guest.as_ref()).await {
            Ok(cart) => self.apply(ticket, cart, |_| {}),
            Err(e) => self.fail(&e, messages::REMOVE_FAILED),
        }
    }

    /// Set a line item's quantity.
    ///
    /// Non-positive quantities are ignored without a network call; use
    /// [`remove_item`](Self::remove_item) to drop a line.
    #[instrument(skip(self, item_id), fields(item_id = %item_id))]
    pub async fn update_quantity(&self, item_id: &CartLineId, quantity: i64) -> SyncOutcome {
        let quantity = match u32::try_from(quantity) {
            Ok(q) if q > 0 => q,
            _ => {
                debug!("Ignoring out-of-range quantity");
                return SyncOutcome::Skipped;
            }
        };

        let ticket = self.begin();
        let guest = self.outgoing_guest_token();

        match self
            .api
            .update_quantity(item_id, quantity, guest.as_ref())
            .await
        {
            Ok(cart) => self.apply(ticket, cart, |_| {}),
            Err(e) => self.fail(&e, messages::UPDATE_FAILED),
        }
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> SyncOutcome {
        let ticket = self.begin();
        let guest = self.outgoing_guest_token();

        match self.api.clear_cart(guest.as_ref()).await {
            Ok(cart) => self.apply(ticket, cart, |s| s.items = Some(Vec::new())),
            Err(e) => self.fail(&e, messages::CLEAR_FAILED),
        }
    }

    // =========================================================================
    // Local-only transitions
    // =========================================================================

    /// Show the cart.
    pub fn open(&self) {
        self.state.send_if_modified(|s| !std::mem::replace(&mut s.is_open, true));
    }

    /// Hide the cart.
    pub fn close(&self) {
        self.state.send_if_modified(|s| std::mem::replace(&mut s.is_open, false));
    }

    /// Flip cart visibility.
    pub fn toggle(&self) {
        self.state.send_modify(|s| s.is_open = !s.is_open);
    }

    /// Forget the cached cart, e.g. on sign-out.
    ///
    /// Responses to requests started before the reset are discarded. The
    /// guest token is kept.
    pub fn reset(&self) {
        let barrier = self.last_ticket.load(Ordering::SeqCst);
        self.state.send_modify(|s| {
            s.items = None;
            s.cart = None;
            s.is_open = false;
            s.last_synced_at = None;
            s.applied_seq = s.applied_seq.max(barrier);
        });
        debug!(barrier, "Cart state reset");
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Issue a ticket and mark an operation in flight.
    fn begin(&self) -> u64 {
        let ticket = self.last_ticket.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.state
            .send_modify(|s| s.in_flight = s.in_flight.saturating_add(1));
        ticket
    }

    /// Mark an operation finished without touching anything else.
    fn finish(&self) {
        self.state
            .send_modify(|s| s.in_flight = s.in_flight.saturating_sub(1));
    }

    /// Finish an operation, running `f` only if `ticket` is the newest seen.
    fn settle(&self, ticket: u64, f: impl FnOnce(&mut CartState)) -> bool {
        let mut fresh = false;
        self.state.send_modify(|s| {
            s.in_flight = s.in_flight.saturating_sub(1);
            if ticket > s.applied_seq {
                s.applied_seq = ticket;
                fresh = true;
                f(s);
            }
        });
        fresh
    }

    /// Adopt a backend snapshot, then run `adjust` on the new state.
    fn apply(
        &self,
        ticket: u64,
        cart: RemoteCart,
        adjust: impl FnOnce(&mut CartState),
    ) -> SyncOutcome {
        let adopt = if self.identity.is_authenticated() {
            None
        } else {
            cart.guest_id.clone()
        };
        let items = items_from_cart(&cart);
        let line_count = items.len();

        let fresh = self.settle(ticket, |s| {
            if let Some(token) = &adopt {
                s.guest_token = Some(token.clone());
            }
            s.items = Some(items);
            s.cart = Some(cart);
            s.last_synced_at = Some(Utc::now());
            adjust(s);
        });

        if !fresh {
            debug!(ticket, "Discarding stale cart response");
            return SyncOutcome::Stale;
        }

        if let Some(token) = adopt
            && let Err(e) = self.storage.set(keys::GUEST_ID, token.as_str())
        {
            warn!(error = %e, "Failed to persist guest token");
        }

        debug!(ticket, lines = line_count, "Applied cart snapshot");
        SyncOutcome::Applied
    }

    /// Finish a failed mutation and tell the shopper.
    fn fail(&self, error: &ApiError, message: &str) -> SyncOutcome {
        self.finish();
        error!(error = %error, "Cart operation failed");
        self.sink.error(message);
        SyncOutcome::Failed
    }

    fn held_guest_token(&self) -> Option<GuestToken> {
        self.state.borrow().guest_token.clone()
    }

    /// The guest token to send: held token, only while signed out.
    fn outgoing_guest_token(&self) -> Option<GuestToken> {
        if self.identity.is_authenticated() {
            None
        } else {
            self.held_guest_token()
        }
    }

    fn discard_guest_token(&self) {
        if let Err(e) = self.storage.remove(keys::GUEST_ID) {
            warn!(error = %e, "Failed to remove guest token from storage");
        }
        if self.state.send_if_modified(|s| s.guest_token.take().is_some()) {
            info!("Discarded guest token after fetching signed-in cart");
        }
    }

    fn discard_credentials(&self) {
        for key in [keys::GUEST_ID, keys::ACCESS_TOKEN] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "Failed to clear stored credential");
            }
        }
        self.state.send_if_modified(|s| s.guest_token.take().is_some());
    }
}
