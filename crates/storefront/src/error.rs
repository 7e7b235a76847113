//! Unified error handling with Sentry integration.
//!
//! Every failure a front end can see funnels into [`StorefrontError`], which
//! knows its category and the notice to show the user. Internal detail (which
//! credential was wrong, raw HTTP errors) never reaches the notice.

use thiserror::Error;

use paperback_core::{EmailError, ValidationErrors};

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::auth::AuthError;
use crate::services::orders::SubmitError;

/// Notice shown when the admin session timer fires.
pub const SESSION_EXPIRED_NOTICE: &str = "Your session has expired. Please log in again.";

/// Notice shown when the auth endpoint rejects the credentials.
pub const INVALID_CREDENTIALS_NOTICE: &str = "Invalid credentials. Please try again.";

/// Notice shown when order submission fails remotely.
pub const ORDER_FAILED_NOTICE: &str =
    "Failed to place your order. Please check your details and try again.";

/// Broad category of a failure, for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Field-level input problems; nothing was sent.
    Validation,
    /// Credentials rejected or admin access missing.
    Auth,
    /// Network failure or non-success from the remote service.
    Remote,
    /// The admin session timed out.
    SessionExpired,
    /// Local setup problems (configuration, state directory).
    Local,
}

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Checkout form or cart failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Buyer email is malformed.
    #[error("invalid email: {0}")]
    Email(#[from] EmailError),

    /// Admin authentication failed.
    #[error("Auth error: {0}")]
    Auth(AuthError),

    /// The admin session expired.
    #[error("admin session expired")]
    SessionExpired,

    /// Order submission failed.
    #[error("Order error: {0}")]
    Submit(#[from] SubmitError),

    /// Any other API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<AuthError> for StorefrontError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::SessionExpired => Self::SessionExpired,
            other => Self::Auth(other),
        }
    }
}

impl StorefrontError {
    /// Category of this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Email(_) => ErrorKind::Validation,
            Self::Auth(AuthError::Remote(_)) | Self::Submit(_) | Self::Api(_) => {
                ErrorKind::Remote
            }
            Self::Auth(AuthError::Store(_)) | Self::Config(_) => ErrorKind::Local,
            Self::Auth(_) => ErrorKind::Auth,
            Self::SessionExpired => ErrorKind::SessionExpired,
        }
    }

    /// User-facing message.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::Validation(errors) => {
                let fields = errors
                    .fields()
                    .map(|field| field.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Please complete the required fields: {fields}")
            }
            Self::Email(_) => "Please sign in with a valid email address.".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => INVALID_CREDENTIALS_NOTICE.to_string(),
                AuthError::NotAuthenticated => {
                    "Please log in as an admin to continue.".to_string()
                }
                AuthError::AlreadyInFlight => "Login is already in progress.".to_string(),
                AuthError::SessionExpired => SESSION_EXPIRED_NOTICE.to_string(),
                AuthError::Remote(reason) => format!("Request failed: {reason}"),
                AuthError::Store(_) => "Could not access the saved admin session.".to_string(),
            },
            Self::SessionExpired => SESSION_EXPIRED_NOTICE.to_string(),
            Self::Submit(SubmitError::AlreadyInFlight) => {
                "Your order is already being placed.".to_string()
            }
            Self::Submit(SubmitError::Remote(_)) => ORDER_FAILED_NOTICE.to_string(),
            Self::Api(err) => err.reason(),
            Self::Config(err) => err.to_string(),
        }
    }

    /// Log the error and send remote failures to Sentry.
    pub fn report(&self) {
        if self.kind() == ErrorKind::Remote {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Remote request failed"
            );
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
