//! Storefront backend API clients.
//!
//! # Architecture
//!
//! - The backend owns the cart: pricing, discounts, tax and guest-session
//!   issuance all happen server-side. The client only fetches and mutates.
//! - [`CartApi`] is the seam the cart synchronizer depends on; [`HttpCartClient`]
//!   is the `reqwest` implementation. Cart calls are never cached.
//! - [`ProductCatalog`] serves product pages; [`HttpCatalogClient`] caches
//!   responses in memory via `moka`.
//!
//! # Example
//!
//! ```rust,ignore
//! use forvrmurr_storefront::api::{CartApi, HttpCartClient};
//!
//! let client = HttpCartClient::new(&config.api, storage.clone())?;
//! let cart = client
//!     .add_item(&CartLineInput::new(product_id, 1), None)
//!     .await?;
//! let guest = cart.guest_id; // issued on the first guest mutation
//! ```

mod cache;
mod catalog;
mod client;
pub mod types;

use std::future::Future;

use forvrmurr_core::{CartLineId, GuestToken};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

pub use catalog::{HttpCatalogClient, ProductCatalog};
pub use client::HttpCartClient;
pub use types::*;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest slice of a response body kept in errors and logs.
const BODY_SNIPPET_LEN: usize = 200;

/// Errors that can occur when talking to the storefront backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connect, timeout, TLS...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Credentials missing, expired or rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Remote cart service boundary.
///
/// Every call returns the full cart snapshot. Guest calls pass the held
/// guest token (if any); the backend may issue or rotate one in the
/// response's `guest_id`.
pub trait CartApi: Send + Sync {
    /// Fetch the signed-in customer's cart.
    fn get_cart(&self) -> impl Future<Output = Result<RemoteCart, ApiError>> + Send;

    /// Fetch a guest cart by token.
    fn get_guest_cart(
        &self,
        guest: &GuestToken,
    ) -> impl Future<Output = Result<RemoteCart, ApiError>> + Send;

    /// Add a product.
    fn add_item(
        &self,
        line: &CartLineInput,
        guest: Option<&GuestToken>,
    ) -> impl Future<Output = Result<RemoteCart, ApiError>> + Send;

    /// Remove a line item.
    fn remove_item(
        &self,
        item_id: &CartLineId,
        guest: Option<&GuestToken>,
    ) -> impl Future<Output = Result<RemoteCart, ApiError>> + Send;

    /// Set a line item's quantity.
    fn update_quantity(
        &self,
        item_id: &CartLineId,
        quantity: u32,
        guest: Option<&GuestToken>,
    ) -> impl Future<Output = Result<RemoteCart, ApiError>> + Send;

    /// Empty the cart.
    fn clear_cart(
        &self,
        guest: Option<&GuestToken>,
    ) -> impl Future<Output = Result<RemoteCart, ApiError>> + Send;
}

/// First `BODY_SNIPPET_LEN` characters of a response body.
fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_LEN).collect()
}

/// Send a request and decode a JSON response, mapping failure statuses.
///
/// Attaches a fresh `x-request-id` and, when given, a bearer token.
async fn execute<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    bearer: Option<String>,
) -> Result<T, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    let mut request = request.header(REQUEST_ID_HEADER, &request_id);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    let status = response.status();

    // Check for rate limiting
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(ApiError::RateLimited(retry_after));
    }

    // Get response body as text first for better error diagnostics
    let body = response.text().await?;

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        tracing::warn!(%request_id, status = %status, "Backend rejected credentials");
        return Err(ApiError::Unauthorized);
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(snippet(&body)));
    }

    if !status.is_success() {
        tracing::error!(
            %request_id,
            status = %status,
            body = %snippet(&body),
            "Backend returned non-success status"
        );
        return Err(ApiError::Api {
            status: status.as_u16(),
            message: snippet(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            %request_id,
            error = %e,
            body = %snippet(&body),
            "Failed to parse backend response"
        );
        ApiError::Parse(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("cart".to_string());
        assert_eq!(err.to_string(), "Not found: cart");

        let err = ApiError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 502 - bad gateway");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = ApiError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }

    #[test]
    fn test_snippet_truncates() {
        let body = "x".repeat(500);
        assert_eq!(snippet(&body).len(), BODY_SNIPPET_LEN);
        assert_eq!(snippet("short"), "short");
    }
}
