//! Shopper identity.
//!
//! A shopper is either signed in (a [`Principal`] resolved by the auth
//! collaborator) or a guest. The cart synchronizer only asks two questions:
//! "is anyone signed in?" and "who?".

use std::sync::{Arc, PoisonError, RwLock};

use forvrmurr_core::CustomerId;
use serde::{Deserialize, Serialize};

use crate::storage::{ClientStorage, keys};

/// A signed-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Backend customer ID.
    pub id: CustomerId,
    /// Email address, when the auth provider shares it.
    pub email: Option<String>,
}

/// Source of truth for the current identity.
pub trait IdentityProvider: Send + Sync {
    /// The signed-in customer, or `None` for guests.
    fn principal(&self) -> Option<Principal>;

    /// Whether a customer is signed in.
    fn is_authenticated(&self) -> bool {
        self.principal().is_some()
    }
}

/// In-process identity holder with explicit sign-in and sign-out.
#[derive(Debug, Default)]
pub struct SessionIdentity {
    current: RwLock<Option<Principal>>,
}

impl SessionIdentity {
    /// Start as a guest.
    #[must_use]
    pub fn guest() -> Self {
        Self::default()
    }

    /// Start signed in.
    #[must_use]
    pub fn signed_in(principal: Principal) -> Self {
        Self {
            current: RwLock::new(Some(principal)),
        }
    }

    /// Record a successful sign-in.
    pub fn sign_in(&self, principal: Principal) {
        tracing::info!(customer_id = %principal.id, "Customer signed in");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(principal);
    }

    /// Drop back to guest.
    pub fn sign_out(&self) {
        tracing::info!("Customer signed out");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl IdentityProvider for SessionIdentity {
    fn principal(&self) -> Option<Principal> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Identity derived from the access token in client storage.
///
/// Signed in exactly while a non-empty token is stored, so clearing the
/// token (sign-out, or the add-to-cart recovery path) drops back to guest.
/// The backend resolves the customer from the token, so the principal is
/// always `me`.
pub struct StoredTokenIdentity {
    storage: Arc<dyn ClientStorage>,
}

impl StoredTokenIdentity {
    /// Customer ID the backend resolves from a bearer token.
    pub const SELF_ID: &str = "me";

    /// Watch `storage` for an access token.
    #[must_use]
    pub fn new(storage: Arc<dyn ClientStorage>) -> Self {
        Self { storage }
    }
}

impl std::fmt::Debug for StoredTokenIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredTokenIdentity")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl IdentityProvider for StoredTokenIdentity {
    fn principal(&self) -> Option<Principal> {
        match self.storage.get(keys::ACCESS_TOKEN) {
            Ok(Some(token)) if !token.is_empty() => Some(Principal {
                id: CustomerId::new(Self::SELF_ID),
                email: None,
            }),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read access token; treating as guest");
                None
            }
        }
    }
}
