//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FORVRMURR_API_URL` - Base URL of the storefront backend API
//!
//! ## Optional
//! - `FORVRMURR_STORAGE_PATH` - Durable client storage file (default: .forvrmurr/storage.json)
//! - `FORVRMURR_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 15)
//! - `FORVRMURR_CATALOG_CACHE_TTL_SECS` - Product cache lifetime (default: 300)
//! - `FORVRMURR_SHIPPING_FLAT_RATE` - Shipping charged without free shipping (default: 0)
//! - `FORVRMURR_TAX_RATE` - Tax rate as a fraction, e.g. 0.075 (default: no tax line)
//! - `FORVRMURR_ACCESS_TOKEN` - Signed-in customer's bearer token
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use forvrmurr_core::CurrencyCode;
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_PATH: &str = ".forvrmurr/storage.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend API configuration
    pub api: ApiConfig,
    /// File backing the durable client storage
    pub storage_path: PathBuf,
    /// How long catalog responses stay cached
    pub catalog_cache_ttl: Duration,
    /// Checkout pricing rules (shipping, tax)
    pub pricing: PricingConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. production, staging)
    pub sentry_environment: Option<String>,
}

/// Backend API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://api.forvrmurr.com/api`
    pub base_url: Url,
    /// Timeout applied to every request
    pub request_timeout: Duration,
    /// Bearer token for a signed-in customer, if any
    pub access_token: Option<SecretString>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("request_timeout", &self.request_timeout)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl ApiConfig {
    /// Build an endpoint URL by appending path segments to the base URL.
    ///
    /// Segments are percent-encoded, so opaque IDs can be passed as-is.
    #[must_use]
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Only cannot-be-a-base URLs refuse segments; http(s) URLs never do.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Shipping and tax rules used by the checkout summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingConfig {
    /// Shipping cost when the cart isn't eligible for free shipping
    pub shipping_flat_rate: Decimal,
    /// Tax rate as a fraction; `None` hides the tax line
    pub tax_rate: Option<Decimal>,
    /// Currency for all storefront amounts
    pub currency: CurrencyCode,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            shipping_flat_rate: Decimal::ZERO,
            tax_rate: None,
            currency: CurrencyCode::NGN,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = ApiConfig::from_env()?;
        let storage_path = PathBuf::from(get_env_or_default(
            "FORVRMURR_STORAGE_PATH",
            DEFAULT_STORAGE_PATH,
        ));
        let catalog_cache_ttl = Duration::from_secs(parse_env_or(
            "FORVRMURR_CATALOG_CACHE_TTL_SECS",
            DEFAULT_CATALOG_CACHE_TTL_SECS,
        )?);
        let pricing = PricingConfig::from_env()?;

        Ok(Self {
            api,
            storage_path,
            catalog_cache_ttl,
            pricing,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(
            "FORVRMURR_API_URL",
            &get_required_env("FORVRMURR_API_URL")?,
        )?;
        let request_timeout = Duration::from_secs(parse_env_or(
            "FORVRMURR_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);

        Ok(Self {
            base_url,
            request_timeout,
            access_token: get_optional_env("FORVRMURR_ACCESS_TOKEN").map(SecretString::from),
        })
    }
}

impl PricingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let shipping_flat_rate = match get_optional_env("FORVRMURR_SHIPPING_FLAT_RATE") {
            Some(raw) => parse_amount("FORVRMURR_SHIPPING_FLAT_RATE", &raw)?,
            None => Decimal::ZERO,
        };
        let tax_rate = get_optional_env("FORVRMURR_TAX_RATE")
            .map(|raw| parse_tax_rate("FORVRMURR_TAX_RATE", &raw))
            .transpose()?;

        Ok(Self {
            shipping_flat_rate,
            tax_rate,
            currency: CurrencyCode::NGN,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional environment variable, falling back to `default`.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse and validate the backend base URL (http or https only).
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}

/// Parse a non-negative monetary amount.
fn parse_amount(key: &str, raw: &str) -> Result<Decimal, ConfigError> {
    let amount = Decimal::from_str(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(amount)
}

/// Parse a tax rate expressed as a fraction between 0 and 1.
fn parse_tax_rate(key: &str, raw: &str) -> Result<Decimal, ConfigError> {
    let rate = parse_amount(key, raw)?;
    if rate > Decimal::ONE {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{rate} is above 1 (use 0.075 for 7.5%)"),
        ));
    }
    Ok(rate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn api_config(token: Option<&str>) -> ApiConfig {
        ApiConfig {
            base_url: Url::parse("https://api.forvrmurr.test/api/").unwrap(),
            request_timeout: Duration::from_secs(15),
            access_token: token.map(|t| SecretString::from(t.to_string())),
        }
    }

    #[test]
    fn test_parse_base_url_accepts_https() {
        let url = parse_base_url("TEST_URL", "https://api.example.com/v1").unwrap();
        assert_eq!(url.host_str(), Some("api.example.com"));
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        let err = parse_base_url("TEST_URL", "ftp://example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(parse_base_url("TEST_URL", "not a url").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("TEST", "2500").unwrap(), Decimal::from(2500));
        assert!(parse_amount("TEST", "-1").is_err());
        assert!(parse_amount("TEST", "abc").is_err());
    }

    #[test]
    fn test_parse_tax_rate_bounds() {
        assert_eq!(parse_tax_rate("TEST", "0.075").unwrap(), Decimal::new(75, 3));
        let err = parse_tax_rate("TEST", "7.5").unwrap_err();
        assert!(err.to_string().contains("above 1"));
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = api_config(None);
        assert_eq!(
            config.endpoint(&["cart", "items"]).as_str(),
            "https://api.forvrmurr.test/api/cart/items"
        );
        assert_eq!(
            config.endpoint(&["cart"]).as_str(),
            "https://api.forvrmurr.test/api/cart"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let config = api_config(None);
        assert_eq!(
            config.endpoint(&["cart", "items", "a b/c"]).as_str(),
            "https://api.forvrmurr.test/api/cart/items/a%20b%2Fc"
        );
    }

    #[test]
    fn test_api_config_debug_redacts_token() {
        let config = api_config(Some("super_secret_bearer"));
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("api.forvrmurr.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_bearer"));
        assert_eq!(
            config.access_token.unwrap().expose_secret(),
            "super_secret_bearer"
        );
    }

    #[test]
    fn test_pricing_default_has_no_tax() {
        let pricing = PricingConfig::default();
        assert!(pricing.tax_rate.is_none());
        assert_eq!(pricing.shipping_flat_rate, Decimal::ZERO);
        assert_eq!(pricing.currency, CurrencyCode::NGN);
    }
}
