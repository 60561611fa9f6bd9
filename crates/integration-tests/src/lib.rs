//! Integration test harness for the ForvrMurr storefront client.
//!
//! [`TestBackend`] is an in-process stand-in for the storefront REST API,
//! served by axum on an ephemeral localhost port. It keeps carts in memory,
//! issues guest tokens the way the real backend does, and counts requests
//! per route so tests can assert on caching.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p forvrmurr-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = TestBackend::spawn().await;
//! backend.add_product(product("prod-a", "grand-soir", "12500.00"));
//! let config = backend.api_config();
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use forvrmurr_core::{CartLineId, GuestToken, ProductId, ScentNotes};
use forvrmurr_storefront::api::{
    AppliedDiscount, BrandRef, CartLineInput, Product, ProductPage, QuantityUpdate, RemoteCart,
    RemoteCartItem, RemoteProductRef,
};
use forvrmurr_storefront::checkout::FREE_SHIPPING_CODE;
use forvrmurr_storefront::config::ApiConfig;
use rust_decimal::Decimal;
use serde::Deserialize;
use url::Url;

/// Catalog page size served by the fake backend.
pub const PAGE_SIZE: usize = 2;

type Rejection = (StatusCode, String);

// =============================================================================
// Backend State
// =============================================================================

#[derive(Debug, Clone)]
struct Line {
    id: CartLineId,
    product_id: ProductId,
    quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Owner {
    Customer(String),
    Guest(GuestToken),
}

#[derive(Debug, Default)]
struct BackendState {
    products: Vec<Product>,
    carts: HashMap<Owner, Vec<Line>>,
    access_tokens: HashSet<String>,
    discounts: Vec<AppliedDiscount>,
    free_shipping_over: Option<Decimal>,
    failures_pending: usize,
    hits: HashMap<&'static str, usize>,
    next_guest: u64,
    next_line: u64,
}

impl BackendState {
    fn hit(&mut self, route: &'static str) {
        *self.hits.entry(route).or_default() += 1;
    }

    fn take_failure(&mut self) -> Result<(), Rejection> {
        if self.failures_pending > 0 {
            self.failures_pending -= 1;
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "injected failure".to_string(),
            ));
        }
        Ok(())
    }

    fn issue_guest(&mut self) -> GuestToken {
        self.next_guest += 1;
        let token = GuestToken::new(format!("guest-{}", self.next_guest));
        self.carts.insert(Owner::Guest(token.clone()), Vec::new());
        token
    }

    /// Resolve who a cart request is for.
    ///
    /// A bearer token must be registered. Guests without a known token get a
    /// fresh one when `issue` is set.
    fn owner(
        &mut self,
        headers: &HeaderMap,
        guest: Option<GuestToken>,
        issue: bool,
    ) -> Result<Owner, Rejection> {
        if let Some(token) = bearer(headers) {
            return if self.access_tokens.contains(&token) {
                Ok(Owner::Customer(token))
            } else {
                Err((StatusCode::UNAUTHORIZED, "invalid token".to_string()))
            };
        }

        match guest {
            Some(token) if self.carts.contains_key(&Owner::Guest(token.clone())) => {
                Ok(Owner::Guest(token))
            }
            _ if issue => Ok(Owner::Guest(self.issue_guest())),
            _ => Err((StatusCode::BAD_REQUEST, "guestId required".to_string())),
        }
    }

    fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    fn snapshot(&self, owner: &Owner) -> RemoteCart {
        let lines = self.carts.get(owner).cloned().unwrap_or_default();
        let mut subtotal = Decimal::ZERO;

        let items = lines
            .iter()
            .filter_map(|line| {
                let product = self.product(&line.product_id)?;
                let price = Decimal::from_str(&product.naira_price).unwrap_or_default();
                subtotal += price * Decimal::from(line.quantity);
                Some(RemoteCartItem {
                    id: line.id.clone(),
                    price: product.naira_price.clone(),
                    quantity: i64::from(line.quantity),
                    product: RemoteProductRef {
                        id: product.id.clone(),
                        name: product.name.clone(),
                        slug: Some(product.slug.clone()),
                        image_url: None,
                        image_urls: product.image_urls.clone(),
                        brand: product.brand.clone(),
                    },
                })
            })
            .collect();

        let mut applied_discounts = if lines.is_empty() {
            Vec::new()
        } else {
            self.discounts.clone()
        };
        let has_free_shipping = self
            .free_shipping_over
            .is_some_and(|threshold| !lines.is_empty() && subtotal >= threshold);
        if has_free_shipping {
            applied_discounts.push(AppliedDiscount {
                title: FREE_SHIPPING_CODE.to_string(),
                amount_deducted: Decimal::ZERO,
            });
        }

        let (id, guest_id) = match owner {
            Owner::Customer(token) => (format!("cart-{token}"), None),
            Owner::Guest(token) => (format!("cart-{}", token.as_str()), Some(token.clone())),
        };

        RemoteCart {
            id: Some(id),
            items,
            applied_discounts,
            has_free_shipping,
            guest_id,
        }
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(String::from)
}

// =============================================================================
// TestBackend
// =============================================================================

/// Fake storefront backend bound to `127.0.0.1` on an ephemeral port.
#[derive(Clone)]
pub struct TestBackend {
    base_url: Url,
    state: Arc<Mutex<BackendState>>,
}

impl TestBackend {
    /// Start the backend; it runs until the test's runtime shuts down.
    ///
    /// # Panics
    ///
    /// Panics if the listener can't be bound.
    pub async fn spawn() -> Self {
        let state = Arc::new(Mutex::new(BackendState::default()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test backend");
        let addr = listener.local_addr().expect("Failed to read local address");

        let app = router(Arc::clone(&state));
        tokio::spawn(async move { axum::serve(listener, app).await });

        let base_url =
            Url::parse(&format!("http://{addr}/api/")).expect("Failed to build base URL");
        Self { base_url, state }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut BackendState) -> T) -> T {
        f(&mut self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// API configuration pointing at this backend.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(5),
            access_token: None,
        }
    }

    /// Add a product to the catalog.
    pub fn add_product(&self, product: Product) {
        self.with_state(|s| s.products.push(product));
    }

    /// Accept `token` as a signed-in customer's bearer token.
    pub fn register_access_token(&self, token: &str) {
        self.with_state(|s| s.access_tokens.insert(token.to_string()));
    }

    /// Apply a discount to every non-empty cart.
    pub fn add_discount(&self, title: &str, amount: Decimal) {
        self.with_state(|s| {
            s.discounts.push(AppliedDiscount {
                title: title.to_string(),
                amount_deducted: amount,
            });
        });
    }

    /// Ship free once the subtotal reaches `threshold`.
    pub fn free_shipping_over(&self, threshold: Decimal) {
        self.with_state(|s| s.free_shipping_over = Some(threshold));
    }

    /// Fail the next `count` cart mutations with a 500.
    pub fn fail_next_mutations(&self, count: usize) {
        self.with_state(|s| s.failures_pending = count);
    }

    /// Requests served on `route` (e.g. `GET /products/{slug}`).
    #[must_use]
    pub fn hits(&self, route: &str) -> usize {
        self.with_state(|s| s.hits.get(route).copied().unwrap_or_default())
    }

    /// Line count of a guest cart, if the token is known.
    #[must_use]
    pub fn guest_cart_len(&self, token: &str) -> Option<usize> {
        self.with_state(|s| {
            s.carts
                .get(&Owner::Guest(GuestToken::new(token)))
                .map(Vec::len)
        })
    }
}

impl std::fmt::Debug for TestBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestBackend")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Catalog entry with the given ID, slug and naira sample price.
#[must_use]
pub fn product(id: &str, slug: &str, naira_price: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: slug.replace('-', " "),
        slug: slug.to_string(),
        brand: Some(BrandRef {
            name: "Maison Test".to_string(),
        }),
        tier: forvrmurr_core::ProductTier::Prime,
        is_best_seller: false,
        concentration: None,
        naira_price: naira_price.to_string(),
        price_full_bottle: None,
        image_urls: Vec::new(),
        description: None,
        notes: ScentNotes::default(),
    }
}

// =============================================================================
// Routes
// =============================================================================

type Shared = Arc<Mutex<BackendState>>;

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/cart", get(get_cart).delete(clear_cart))
        .route("/api/cart/guest/{token}", get(get_guest_cart))
        .route("/api/cart/items", post(add_item))
        .route("/api/cart/items/{id}", patch(update_item).delete(remove_item))
        .route("/api/products", get(list_products))
        .route("/api/products/{slug}", get(get_product))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct GuestQuery {
    #[serde(rename = "guestId")]
    guest_id: Option<GuestToken>,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<usize>,
}

fn lock(state: &Shared) -> std::sync::MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn get_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<RemoteCart>, Rejection> {
    let mut s = lock(&state);
    s.hit("GET /cart");
    if bearer(&headers).is_none() {
        return Err((StatusCode::UNAUTHORIZED, "sign in required".to_string()));
    }
    let owner = s.owner(&headers, None, false)?;
    Ok(Json(s.snapshot(&owner)))
}

async fn get_guest_cart(
    State(state): State<Shared>,
    Path(token): Path<String>,
) -> Result<Json<RemoteCart>, Rejection> {
    let mut s = lock(&state);
    s.hit("GET /cart/guest/{token}");
    let owner = Owner::Guest(GuestToken::new(token));
    if !s.carts.contains_key(&owner) {
        return Err((StatusCode::NOT_FOUND, "unknown guest".to_string()));
    }
    Ok(Json(s.snapshot(&owner)))
}

async fn add_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<GuestQuery>,
    Json(input): Json<CartLineInput>,
) -> Result<Json<RemoteCart>, Rejection> {
    let mut s = lock(&state);
    s.hit("POST /cart/items");
    s.take_failure()?;
    let owner = s.owner(&headers, query.guest_id, true)?;
    if s.product(&input.product_id).is_none() {
        return Err((StatusCode::NOT_FOUND, "unknown product".to_string()));
    }

    s.next_line += 1;
    let line_id = CartLineId::new(format!("line-{}", s.next_line));
    let lines = s.carts.entry(owner.clone()).or_default();
    match lines.iter_mut().find(|l| l.product_id == input.product_id) {
        Some(line) => line.quantity += input.quantity,
        None => lines.push(Line {
            id: line_id,
            product_id: input.product_id,
            quantity: input.quantity,
        }),
    }
    Ok(Json(s.snapshot(&owner)))
}

async fn update_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<GuestQuery>,
    Json(update): Json<QuantityUpdate>,
) -> Result<Json<RemoteCart>, Rejection> {
    let mut s = lock(&state);
    s.hit("PATCH /cart/items/{id}");
    s.take_failure()?;
    let owner = s.owner(&headers, query.guest_id, false)?;
    let line = s
        .carts
        .get_mut(&owner)
        .and_then(|lines| lines.iter_mut().find(|l| l.id.as_str() == id))
        .ok_or((StatusCode::NOT_FOUND, "unknown line".to_string()))?;
    line.quantity = update.quantity;
    Ok(Json(s.snapshot(&owner)))
}

async fn remove_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<GuestQuery>,
) -> Result<Json<RemoteCart>, Rejection> {
    let mut s = lock(&state);
    s.hit("DELETE /cart/items/{id}");
    s.take_failure()?;
    let owner = s.owner(&headers, query.guest_id, false)?;
    if let Some(lines) = s.carts.get_mut(&owner) {
        lines.retain(|l| l.id.as_str() != id);
    }
    Ok(Json(s.snapshot(&owner)))
}

async fn clear_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<GuestQuery>,
) -> Result<Json<RemoteCart>, Rejection> {
    let mut s = lock(&state);
    s.hit("DELETE /cart");
    s.take_failure()?;
    let owner = s.owner(&headers, query.guest_id, false)?;
    s.carts.insert(owner.clone(), Vec::new());
    Ok(Json(s.snapshot(&owner)))
}

async fn get_product(
    State(state): State<Shared>,
    Path(slug): Path<String>,
) -> Result<Json<Product>, Rejection> {
    let mut s = lock(&state);
    s.hit("GET /products/{slug}");
    s.products
        .iter()
        .find(|p| p.slug == slug)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("no product {slug}")))
}

async fn list_products(
    State(state): State<Shared>,
    Query(query): Query<PageQuery>,
) -> Json<ProductPage> {
    let mut s = lock(&state);
    s.hit("GET /products");
    let page = query.page.unwrap_or(1).max(1);
    let items = s
        .products
        .iter()
        .skip((page - 1).saturating_mul(PAGE_SIZE))
        .take(PAGE_SIZE)
        .cloned()
        .collect();
    Json(ProductPage {
        items,
        total: u64::try_from(s.products.len()).unwrap_or(u64::MAX),
        page: u32::try_from(page).unwrap_or(u32::MAX),
    })
}
