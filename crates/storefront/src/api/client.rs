//! HTTP implementation of [`CartApi`].

use std::sync::Arc;

use forvrmurr_core::{CartLineId, GuestToken};
use tracing::{debug, instrument, warn};
use url::Url;

use super::{ApiError, CartApi, CartLineInput, QuantityUpdate, RemoteCart, execute};
use crate::config::ApiConfig;
use crate::storage::{ClientStorage, keys};

// =============================================================================
// HttpCartClient
// =============================================================================

/// Cart client for the storefront backend REST API.
///
/// The bearer token for authenticated calls is read from client storage on
/// every request, so signing in or out takes effect without rebuilding the
/// client.
#[derive(Clone)]
pub struct HttpCartClient {
    inner: Arc<HttpCartClientInner>,
}

struct HttpCartClientInner {
    client: reqwest::Client,
    config: ApiConfig,
    storage: Arc<dyn ClientStorage>,
}

impl std::fmt::Debug for HttpCartClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCartClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl HttpCartClient {
    /// Create a new cart client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, storage: Arc<dyn ClientStorage>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpCartClientInner {
                client,
                config: config.clone(),
                storage,
            }),
        })
    }

    /// Bearer token from storage. Unreadable storage counts as signed out.
    fn bearer(&self) -> Option<String> {
        match self.inner.storage.get(keys::ACCESS_TOKEN) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read access token from storage");
                None
            }
        }
    }

    /// Cart endpoint URL with an optional `guestId` query parameter.
    fn cart_url(&self, segments: &[&str], guest: Option<&GuestToken>) -> Url {
        let mut url = self.inner.config.endpoint(segments);
        if let Some(guest) = guest {
            url.query_pairs_mut().append_pair("guestId", guest.as_str());
        }
        url
    }
}

impl CartApi for HttpCartClient {
    #[instrument(skip(self))]
    async fn get_cart(&self) -> Result<RemoteCart, ApiError> {
        let url = self.cart_url(&["cart"], None);
        let cart: RemoteCart = execute(self.inner.client.get(url), self.bearer()).await?;
        debug!(items = cart.items.len(), "Fetched customer cart");
        Ok(cart)
    }

    #[instrument(skip(self))]
    async fn get_guest_cart(&self, guest: &GuestToken) -> Result<RemoteCart, ApiError> {
        let url = self.cart_url(&["cart", "guest", guest.as_str()], None);
        let cart: RemoteCart = execute(self.inner.client.get(url), None).await?;
        debug!(items = cart.items.len(), "Fetched guest cart");
        Ok(cart)
    }

    #[instrument(skip(self, line), fields(product_id = %line.product_id, quantity = line.quantity))]
    async fn add_item(
        &self,
        line: &CartLineInput,
        guest: Option<&GuestToken>,
    ) -> Result<RemoteCart, ApiError> {
        let url = self.cart_url(&["cart", "items"], guest);
        execute(self.inner.client.post(url).json(line), self.bearer()).await
    }

    #[instrument(skip(self, item_id), fields(item_id = %item_id))]
    async fn remove_item(
        &self,
        item_id: &CartLineId,
        guest: Option<&GuestToken>,
    ) -> Result<RemoteCart, ApiError> {
        let url = self.cart_url(&["cart", "items", item_id.as_str()], guest);
        execute(self.inner.client.delete(url), self.bearer()).await
    }

    #[instrument(skip(self, item_id), fields(item_id = %item_id))]
    async fn update_quantity(
        &self,
        item_id: &CartLineId,
        quantity: u32,
        guest: Option<&GuestToken>,
    ) -> Result<RemoteCart, ApiError> {
        let url = self.cart_url(&["cart", "items", item_id.as_str()], guest);
        let body = QuantityUpdate { quantity };
        execute(self.inner.client.patch(url).json(&body), self.bearer()).await
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self, guest: Option<&GuestToken>) -> Result<RemoteCart, ApiError> {
        let url = self.cart_url(&["cart"], guest);
        execute(self.inner.client.delete(url), self.bearer()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::storage::MemoryStorage;

    fn client(storage: MemoryStorage) -> HttpCartClient {
        let config = ApiConfig {
            base_url: Url::parse("https://api.forvrmurr.test/api/").unwrap(),
            request_timeout: Duration::from_secs(5),
            access_token: None,
        };
        HttpCartClient::new(&config, Arc::new(storage)).unwrap()
    }

    #[test]
    fn test_cart_url_without_guest() {
        let client = client(MemoryStorage::new());
        let url = client.cart_url(&["cart", "items"], None);
        assert_eq!(url.as_str(), "https://api.forvrmurr.test/api/cart/items");
    }

    #[test]
    fn test_cart_url_with_guest() {
        let client = client(MemoryStorage::new());
        let guest = GuestToken::new("g 1");
        let url = client.cart_url(&["cart", "items", "line-9"], Some(&guest));
        assert_eq!(
            url.as_str(),
            "https://api.forvrmurr.test/api/cart/items/line-9?guestId=g+1"
        );
    }

    #[test]
    fn test_bearer_reads_storage() {
        let client = client(MemoryStorage::with_entries([(keys::ACCESS_TOKEN, "tok")]));
        assert_eq!(client.bearer().as_deref(), Some("tok"));

        client.inner.storage.remove(keys::ACCESS_TOKEN).unwrap();
        assert_eq!(client.bearer(), None);
    }

    #[test]
    fn test_blank_bearer_is_ignored() {
        let client = client(MemoryStorage::with_entries([(keys::ACCESS_TOKEN, "")]));
        assert_eq!(client.bearer(), None);
    }
}
