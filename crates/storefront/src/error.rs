//! Unified error handling with Sentry integration.
//!
//! Library operations return their own error types ([`ApiError`],
//! [`StorageError`], [`ConfigError`]). Front ends that want a single type
//! convert into [`AppError`], which knows which failures are worth reporting
//! and what the shopper may be told.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Client storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the shopper.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is our fault (and so worth a Sentry event).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Api(err) => !matches!(err, ApiError::NotFound(_) | ApiError::Unauthorized),
            Self::Storage(_) | Self::Internal(_) => true,
            Self::Config(_) | Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }

    /// Message safe to show the shopper.
    ///
    /// Internal error details are never exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(ApiError::NotFound(_)) | Self::NotFound(_) => {
                "We couldn't find that.".to_string()
            }
            Self::Api(ApiError::Unauthorized) => "Please sign in again.".to_string(),
            Self::Api(ApiError::RateLimited(_)) => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            Self::Api(_) => "The store is unavailable right now. Please try again.".to_string(),
            Self::Storage(_) | Self::Internal(_) => "Something went wrong.".to_string(),
            Self::Config(err) => err.to_string(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Log the error, capturing server errors to Sentry.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::warn!(error = %self, "Operation failed");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a customer ID.
///
/// Call this once a customer is known to associate errors with them.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("quantity must be positive".to_string());
        assert_eq!(err.to_string(), "Bad request: quantity must be positive");
    }

    #[test]
    fn test_server_error_classification() {
        assert!(AppError::Internal("boom".to_string()).is_server_error());
        assert!(
            AppError::Api(ApiError::Api {
                status: 500,
                message: "boom".to_string()
            })
            .is_server_error()
        );
        assert!(!AppError::Api(ApiError::Unauthorized).is_server_error());
        assert!(!AppError::NotFound("x".to_string()).is_server_error());
        assert!(!AppError::BadRequest("x".to_string()).is_server_error());
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = AppError::Api(ApiError::Api {
            status: 500,
            message: "stack trace here".to_string(),
        });
        assert!(!err.user_message().contains("stack trace"));

        let err = AppError::Internal("db password wrong".to_string());
        assert_eq!(err.user_message(), "Something went wrong.");
    }

    #[test]
    fn test_add_breadcrumb_without_client() {
        add_breadcrumb("cart", "Added item", Some(&[("product_id", "p1")]));
    }
}
