//! CLI command implementations.

pub mod cart;
pub mod product;

use std::sync::Arc;

use forvrmurr_storefront::api::HttpCartClient;
use forvrmurr_storefront::cart::CartSynchronizer;
use forvrmurr_storefront::config::StorefrontConfig;
use forvrmurr_storefront::error::{Result, set_sentry_user};
use forvrmurr_storefront::identity::{IdentityProvider, StoredTokenIdentity};
use forvrmurr_storefront::notify::{ErrorSink, TracingSink};
use forvrmurr_storefront::storage::{ClientStorage, FileStorage, keys};
use secrecy::ExposeSecret;

/// Cart synchronizer wired to the real backend and on-disk storage.
pub struct Session {
    pub sync: CartSynchronizer<HttpCartClient>,
}

impl Session {
    /// Open storage, adopt a configured access token and build the
    /// synchronizer.
    pub fn open(config: &StorefrontConfig) -> Result<Self> {
        let storage: Arc<dyn ClientStorage> = Arc::new(FileStorage::new(&config.storage_path));

        if let Some(token) = &config.api.access_token {
            storage.set(keys::ACCESS_TOKEN, token.expose_secret())?;
        }

        let identity = StoredTokenIdentity::new(Arc::clone(&storage));
        if let Some(principal) = identity.principal() {
            set_sentry_user(&principal.id, principal.email.as_deref());
        }

        let api = HttpCartClient::new(&config.api, Arc::clone(&storage))?;
        let sync = CartSynchronizer::new(api, storage, Arc::new(identity), Arc::new(StderrSink));

        Ok(Self { sync })
    }
}

/// Prints shopper-facing errors and leaves the usual breadcrumb.
struct StderrSink;

impl ErrorSink for StderrSink {
    fn error(&self, message: &str) {
        TracingSink.error(message);
        print_error(message);
    }
}

#[allow(clippy::print_stderr)]
pub fn print_error(message: &str) {
    eprintln!("error: {message}");
}
