//! Product catalog client.
//!
//! Catalog responses change rarely, so they are cached in memory for the
//! configured TTL. Cart responses never go through this cache.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::{ApiError, Product, ProductPage, execute};
use crate::config::ApiConfig;

/// Read-only access to the product catalog.
pub trait ProductCatalog: Send + Sync {
    /// Fetch one product by URL slug.
    fn get_product(&self, slug: &str) -> impl Future<Output = Result<Product, ApiError>> + Send;

    /// Fetch one page of the product listing (1-based).
    fn list_products(&self, page: u32) -> impl Future<Output = Result<ProductPage, ApiError>> + Send;
}

// =============================================================================
// HttpCatalogClient
// =============================================================================

/// Catalog client for the storefront backend REST API.
#[derive(Clone)]
pub struct HttpCatalogClient {
    inner: Arc<HttpCatalogClientInner>,
}

struct HttpCatalogClientInner {
    client: reqwest::Client,
    config: ApiConfig,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for HttpCatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCatalogClient")
            .field("config", &self.inner.config)
            .field("cached_entries", &self.inner.cache.entry_count())
            .finish()
    }
}

impl HttpCatalogClient {
    /// Create a new catalog client caching responses for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, ttl: Duration) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpCatalogClientInner {
                client,
                config: config.clone(),
                cache,
            }),
        })
    }

    /// Drop every cached response.
    pub fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
    }
}

impl ProductCatalog for HttpCatalogClient {
    #[instrument(skip(self))]
    async fn get_product(&self, slug: &str) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(slug.to_string());

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.inner.config.endpoint(&["products", slug]);
        let product: Product = execute(self.inner.client.get(url), None).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    #[instrument(skip(self))]
    async fn list_products(&self, page: u32) -> Result<ProductPage, ApiError> {
        let page = page.max(1);
        let cache_key = CacheKey::Products { page };

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut url = self.inner.config.endpoint(&["products"]);
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());
        let products: ProductPage = execute(self.inner.client.get(url), None).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }
}
